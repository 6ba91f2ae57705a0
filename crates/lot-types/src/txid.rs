use std::fmt;

use serde::{Deserialize, Serialize};

use crate::temporal::LedgerTimestamp;

/// Identifier of the ledger transaction that produced a key modification.
///
/// Always 64 lowercase hex characters (a 32-byte digest). Derivation is
/// deterministic: the same node, sequence and timestamp produce the same id.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    /// Derive a transaction id for the `seq`-th transaction opened on `node_id`.
    pub fn derive(node_id: u16, seq: u64, timestamp: &LedgerTimestamp) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"lot-tx-v1:");
        hasher.update(&node_id.to_be_bytes());
        hasher.update(&seq.to_be_bytes());
        hasher.update(&timestamp.seconds.to_be_bytes());
        hasher.update(&timestamp.nanos.to_be_bytes());
        Self(hex::encode(hasher.finalize().as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self.short_id())
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

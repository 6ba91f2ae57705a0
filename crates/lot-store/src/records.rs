use lot_types::{LedgerTimestamp, TxId};

/// One match returned by a selector query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryRecord {
    pub key: String,
    pub value: Vec<u8>,
}

impl QueryRecord {
    pub fn new(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// One committed write (or delete) of a key, as reported by the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyModification {
    pub tx_id: TxId,
    /// Stored bytes; `None` for tombstones.
    pub value: Option<Vec<u8>>,
    pub timestamp: LedgerTimestamp,
    pub is_delete: bool,
}

impl KeyModification {
    /// A value write.
    pub fn write(tx_id: TxId, value: Vec<u8>, timestamp: LedgerTimestamp) -> Self {
        Self {
            tx_id,
            value: Some(value),
            timestamp,
            is_delete: false,
        }
    }

    /// A tombstone.
    pub fn delete(tx_id: TxId, timestamp: LedgerTimestamp) -> Self {
        Self {
            tx_id,
            value: None,
            timestamp,
            is_delete: true,
        }
    }

    /// The live value after this modification, if any.
    pub fn live_value(&self) -> Option<&[u8]> {
        if self.is_delete {
            None
        } else {
            self.value.as_deref()
        }
    }
}

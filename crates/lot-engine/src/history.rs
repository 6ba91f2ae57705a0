use lot_store::{HistoryStore, KeyModification, ScopedCursor};
use lot_types::TxId;
use serde::Serialize;
use serde_json::value::RawValue;

use crate::error::{EngineError, EngineResult};
use crate::query::raw_json;

/// One row of a reconstructed audit trail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub tx_id: TxId,
    /// Stored document, or `None` for a tombstone.
    pub value: Option<Vec<u8>>,
    /// Human-readable commit time.
    pub timestamp: String,
    pub is_delete: bool,
}

impl From<KeyModification> for HistoryEntry {
    fn from(m: KeyModification) -> Self {
        let value = if m.is_delete { None } else { m.value };
        Self {
            tx_id: m.tx_id,
            value,
            timestamp: m.timestamp.to_human(),
            is_delete: m.is_delete,
        }
    }
}

#[derive(Serialize)]
struct WireEntry<'a> {
    #[serde(rename = "TxId")]
    tx_id: &'a str,
    #[serde(rename = "Value")]
    value: Option<&'a RawValue>,
    #[serde(rename = "Timestamp")]
    timestamp: &'a str,
    #[serde(rename = "IsDelete")]
    is_delete: &'static str,
}

/// Rebuilds the audit trail of a key from the ledger's history cursor.
///
/// Structure-preserving: output order and cardinality equal the cursor's.
/// Nothing is reordered, deduplicated or filtered.
pub struct HistoryReconstructor;

impl HistoryReconstructor {
    /// Fetch and reconstruct the history of `key`.
    pub fn history_for<H: HistoryStore + ?Sized>(
        store: &H,
        key: &str,
    ) -> EngineResult<Vec<HistoryEntry>> {
        if key.is_empty() {
            return Err(EngineError::Validation("history key must not be empty".into()));
        }
        tracing::debug!(key, "reconstructing history");
        let entries = Self::reconstruct(ScopedCursor::new(store.history_for(key)?))?;
        tracing::debug!(key, records = entries.len(), "history reconstructed");
        Ok(entries)
    }

    /// Drain `cursor` into entries. The cursor is closed on every path.
    pub fn reconstruct(
        mut cursor: ScopedCursor<KeyModification>,
    ) -> EngineResult<Vec<HistoryEntry>> {
        let mut entries = Vec::new();
        for item in &mut cursor {
            entries.push(HistoryEntry::from(item?));
        }
        cursor.close()?;
        Ok(entries)
    }

    /// Encode entries as
    /// `[{"TxId":..,"Value":<document|null>,"Timestamp":..,"IsDelete":"true|false"}, ...]`.
    pub fn encode(entries: &[HistoryEntry]) -> EngineResult<Vec<u8>> {
        let wire = entries
            .iter()
            .map(|e| -> EngineResult<WireEntry<'_>> {
                let value = match &e.value {
                    Some(bytes) if !e.is_delete => Some(raw_json(bytes).map_err(|err| {
                        EngineError::Serialization(format!(
                            "history value of tx {} is not valid JSON: {err}",
                            e.tx_id.short_id()
                        ))
                    })?),
                    _ => None,
                };
                Ok(WireEntry {
                    tx_id: e.tx_id.as_str(),
                    value,
                    timestamp: &e.timestamp,
                    is_delete: if e.is_delete { "true" } else { "false" },
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;
        serde_json::to_vec(&wire).map_err(|e| EngineError::Serialization(e.to_string()))
    }
}

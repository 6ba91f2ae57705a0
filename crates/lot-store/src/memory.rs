use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use lot_types::{LedgerTimestamp, TxId};
use serde_json::{Map, Value};

use crate::cursor::{BoxCursor, VecCursor};
use crate::error::{StoreError, StoreResult};
use crate::records::{KeyModification, QueryRecord};
use crate::traits::{HistoryStore, QueryStore, StateStore};

/// In-memory ledger for tests, local demos, and embedding.
///
/// Work happens inside a [`Transaction`] opened with [`begin`](Self::begin).
/// Reads inside a transaction see committed state only; writes are buffered
/// and become visible, and part of each key's history, on
/// [`Transaction::commit`]. Commits are serialized by a single write lock and
/// validated against the key versions the transaction read, so a commit
/// whose reads went stale fails with [`StoreError::ReadConflict`].
pub struct InMemoryLedger {
    node_id: u16,
    tx_seq: AtomicU64,
    open_cursors: Arc<AtomicUsize>,
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    /// Per-key modifications, oldest first.
    history: BTreeMap<String, Vec<KeyModification>>,
}

impl LedgerState {
    fn current(&self, key: &str) -> Option<&[u8]> {
        self.history
            .get(key)
            .and_then(|mods| mods.last())
            .and_then(KeyModification::live_value)
    }

    /// Committed modification count of `key`.
    fn version(&self, key: &str) -> usize {
        self.history.get(key).map_or(0, Vec::len)
    }
}

impl InMemoryLedger {
    pub fn new(node_id: u16) -> Self {
        Self {
            node_id,
            tx_seq: AtomicU64::new(0),
            open_cursors: Arc::new(AtomicUsize::new(0)),
            inner: RwLock::new(LedgerState::default()),
        }
    }

    pub fn node_id(&self) -> u16 {
        self.node_id
    }

    /// Open a transaction stamped with the current wall-clock time.
    pub fn begin(&self) -> Transaction<'_> {
        self.begin_at(LedgerTimestamp::now())
    }

    /// Open a transaction with an explicit timestamp.
    pub fn begin_at(&self, timestamp: LedgerTimestamp) -> Transaction<'_> {
        let seq = self.tx_seq.fetch_add(1, Ordering::SeqCst) + 1;
        Transaction {
            ledger: self,
            tx_id: TxId::derive(self.node_id, seq, &timestamp),
            timestamp,
            reads: Mutex::new(BTreeMap::new()),
            writes: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of cursors handed out and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Number of keys that currently hold a live value.
    pub fn live_key_count(&self) -> usize {
        let state = self.inner.read().expect("lock poisoned");
        state
            .history
            .values()
            .filter(|mods| mods.last().is_some_and(|m| !m.is_delete))
            .count()
    }

    /// Number of committed modifications of `key`, tombstones included.
    pub fn version_count(&self, key: &str) -> usize {
        let state = self.inner.read().expect("lock poisoned");
        state.version(key)
    }

    /// Committed value of `key`, outside any transaction.
    pub fn current(&self, key: &str) -> Option<Vec<u8>> {
        let state = self.inner.read().expect("lock poisoned");
        state.current(key).map(<[u8]>::to_vec)
    }

    /// Committed value of `key` together with its version.
    fn read_committed(&self, key: &str) -> (usize, Option<Vec<u8>>) {
        let state = self.inner.read().expect("lock poisoned");
        (state.version(key), state.current(key).map(<[u8]>::to_vec))
    }

    fn apply(
        &self,
        tx_id: &TxId,
        timestamp: LedgerTimestamp,
        reads: &BTreeMap<String, usize>,
        writes: BTreeMap<String, Option<Vec<u8>>>,
    ) -> StoreResult<()> {
        let mut state = self.inner.write().expect("lock poisoned");
        if let Some((key, _)) = reads.iter().find(|(key, seen)| state.version(key) != **seen) {
            return Err(StoreError::ReadConflict(key.clone()));
        }
        for (key, write) in writes {
            let modification = match write {
                Some(value) => KeyModification::write(tx_id.clone(), value, timestamp),
                None => KeyModification::delete(tx_id.clone(), timestamp),
            };
            state.history.entry(key).or_default().push(modification);
        }
        Ok(())
    }

    fn select(&self, selector: &str) -> StoreResult<Vec<QueryRecord>> {
        let predicate = parse_selector(selector)?;
        let state = self.inner.read().expect("lock poisoned");

        let mut matches = Vec::new();
        for (key, mods) in &state.history {
            let Some(value) = mods.last().and_then(KeyModification::live_value) else {
                continue;
            };
            // Non-JSON or non-object values never match a selector.
            let Ok(Value::Object(doc)) = serde_json::from_slice::<Value>(value) else {
                continue;
            };
            if predicate
                .iter()
                .all(|(field, expected)| doc.get(field) == Some(expected))
            {
                matches.push(QueryRecord::new(key.clone(), value.to_vec()));
            }
        }
        Ok(matches)
    }

    fn modifications(&self, key: &str) -> Vec<KeyModification> {
        let state = self.inner.read().expect("lock poisoned");
        state
            .history
            .get(key)
            .map(|mods| mods.iter().rev().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("node_id", &self.node_id)
            .field("live_keys", &self.live_key_count())
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}

/// Parse an equality selector of the form `{"selector": {"field": value, ...}}`.
///
/// Only top-level scalar equality is supported; operators (`$`-prefixed
/// members) and nested objects are rejected.
fn parse_selector(selector: &str) -> StoreResult<Map<String, Value>> {
    let parsed: Value =
        serde_json::from_str(selector).map_err(|e| StoreError::InvalidQuery(e.to_string()))?;
    let Value::Object(mut root) = parsed else {
        return Err(StoreError::InvalidQuery("query must be a JSON object".into()));
    };
    let Some(Value::Object(predicate)) = root.remove("selector") else {
        return Err(StoreError::InvalidQuery(
            "query must contain a \"selector\" object".into(),
        ));
    };
    for (field, value) in &predicate {
        if field.starts_with('$') || value.is_object() || value.is_array() {
            return Err(StoreError::InvalidQuery(format!(
                "unsupported selector operator on {field}"
            )));
        }
    }
    Ok(predicate)
}

/// A unit of work against an [`InMemoryLedger`].
///
/// Dropping a transaction without committing discards its writes.
pub struct Transaction<'a> {
    ledger: &'a InMemoryLedger,
    tx_id: TxId,
    timestamp: LedgerTimestamp,
    /// Version of each key at its first read.
    reads: Mutex<BTreeMap<String, usize>>,
    writes: Mutex<BTreeMap<String, Option<Vec<u8>>>>,
}

impl Transaction<'_> {
    pub fn tx_id(&self) -> &TxId {
        &self.tx_id
    }

    pub fn timestamp(&self) -> LedgerTimestamp {
        self.timestamp
    }

    /// Number of keys written (or deleted) so far.
    pub fn pending_writes(&self) -> usize {
        self.writes.lock().expect("lock poisoned").len()
    }

    /// Buffer a tombstone for `key`.
    ///
    /// Backend-level only: Lotline never dispatches deletes, but histories
    /// must still be able to carry them.
    pub fn delete_state(&self, key: &str) -> StoreResult<()> {
        check_key(key)?;
        self.writes
            .lock()
            .expect("lock poisoned")
            .insert(key.to_string(), None);
        Ok(())
    }

    /// Apply all buffered writes atomically and return the transaction id.
    ///
    /// Fails with [`StoreError::ReadConflict`], applying nothing, when a key
    /// this transaction read was modified by another commit in the meantime.
    pub fn commit(self) -> StoreResult<TxId> {
        let reads = std::mem::take(&mut *self.reads.lock().expect("lock poisoned"));
        let writes = std::mem::take(&mut *self.writes.lock().expect("lock poisoned"));
        let count = writes.len();
        if let Err(e) = self.ledger.apply(&self.tx_id, self.timestamp, &reads, writes) {
            tracing::debug!(tx = %self.tx_id.short_id(), error = %e, "commit rejected");
            return Err(e);
        }
        tracing::debug!(tx = %self.tx_id.short_id(), writes = count, "transaction committed");
        Ok(self.tx_id)
    }

    /// Discard all buffered writes.
    pub fn rollback(self) {
        let pending = self.pending_writes();
        if pending > 0 {
            tracing::debug!(
                tx = %self.tx_id.short_id(),
                discarded = pending,
                "transaction rolled back"
            );
        }
    }
}

fn check_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        Err(StoreError::EmptyKey)
    } else {
        Ok(())
    }
}

impl StateStore for Transaction<'_> {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        check_key(key)?;
        let (version, value) = self.ledger.read_committed(key);
        self.reads
            .lock()
            .expect("lock poisoned")
            .entry(key.to_string())
            .or_insert(version);
        Ok(value)
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        check_key(key)?;
        self.writes
            .lock()
            .expect("lock poisoned")
            .insert(key.to_string(), Some(value));
        Ok(())
    }
}

impl QueryStore for Transaction<'_> {
    fn query(&self, selector: &str) -> StoreResult<BoxCursor<QueryRecord>> {
        let matches = self.ledger.select(selector)?;
        Ok(Box::new(VecCursor::tracked(
            matches,
            Arc::clone(&self.ledger.open_cursors),
        )))
    }
}

impl HistoryStore for Transaction<'_> {
    /// Most recent modification first.
    fn history_for(&self, key: &str) -> StoreResult<BoxCursor<KeyModification>> {
        check_key(key)?;
        Ok(Box::new(VecCursor::tracked(
            self.ledger.modifications(key),
            Arc::clone(&self.ledger.open_cursors),
        )))
    }
}

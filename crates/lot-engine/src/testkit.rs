//! Scriptable ledger double for engine tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lot_store::{
    BoxCursor, HistoryStore, KeyModification, QueryRecord, QueryStore, RecordCursor, StateStore,
    StoreError, StoreResult,
};

/// Ledger double that counts calls and can fail on demand.
#[derive(Default)]
pub(crate) struct MockLedger {
    pub state: Mutex<BTreeMap<String, Vec<u8>>>,
    pub puts: AtomicUsize,
    pub gets: AtomicUsize,
    pub fail_gets: bool,
    pub fail_puts: bool,
    pub history: Vec<KeyModification>,
    pub query_hits: Vec<QueryRecord>,
    /// Fail the n-th (1-based) `next_record` call on returned cursors.
    pub cursor_fail_at: Option<usize>,
    pub last_selector: Mutex<Option<String>>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, key: &str, value: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
    }

    pub fn stored(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().get(key).cloned()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    fn cursor<T: Clone + Send + 'static>(&self, items: &[T]) -> BoxCursor<T> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Box::new(ScriptedCursor {
            items: items.to_vec(),
            fail_at: self.cursor_fail_at,
            calls: 0,
            closed: Arc::clone(&self.closed),
        })
    }
}

impl StateStore for MockLedger {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets {
            return Err(StoreError::Unavailable("state database offline".into()));
        }
        Ok(self.stored(key))
    }

    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts {
            return Err(StoreError::Unavailable("endorsement failed".into()));
        }
        self.state.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }
}

impl QueryStore for MockLedger {
    fn query(&self, selector: &str) -> StoreResult<BoxCursor<QueryRecord>> {
        *self.last_selector.lock().unwrap() = Some(selector.to_string());
        Ok(self.cursor(&self.query_hits))
    }
}

impl HistoryStore for MockLedger {
    fn history_for(&self, _key: &str) -> StoreResult<BoxCursor<KeyModification>> {
        Ok(self.cursor(&self.history))
    }
}

struct ScriptedCursor<T> {
    items: Vec<T>,
    fail_at: Option<usize>,
    calls: usize,
    closed: Arc<AtomicUsize>,
}

impl<T: Send> RecordCursor<T> for ScriptedCursor<T> {
    fn next_record(&mut self) -> StoreResult<Option<T>> {
        self.calls += 1;
        if self.fail_at == Some(self.calls) {
            return Err(StoreError::Unavailable("cursor interrupted".into()));
        }
        if self.items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.items.remove(0)))
        }
    }

    fn close(&mut self) -> StoreResult<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

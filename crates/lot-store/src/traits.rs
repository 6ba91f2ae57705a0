use crate::cursor::BoxCursor;
use crate::error::StoreResult;
use crate::records::{KeyModification, QueryRecord};

/// Key-value state of the ledger.
///
/// All implementations must satisfy these invariants:
/// - Each call is a single external operation; nothing is cached or retried.
/// - Reads observe committed state as defined by the backing ledger.
/// - All backend errors are propagated, never silently ignored.
pub trait StateStore: Send + Sync {
    /// Read the current value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored (or the key was deleted).
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value.
    fn put_state(&self, key: &str, value: Vec<u8>) -> StoreResult<()>;
}

/// Rich-query interface of the ledger.
pub trait QueryStore: Send + Sync {
    /// Run a selector query and return a cursor over matching documents.
    ///
    /// The selector string is passed to the backend unmodified.
    fn query(&self, selector: &str) -> StoreResult<BoxCursor<QueryRecord>>;
}

/// Key history interface of the ledger.
pub trait HistoryStore: Send + Sync {
    /// Return every committed modification of `key`, in the backend's order.
    fn history_for(&self, key: &str) -> StoreResult<BoxCursor<KeyModification>>;
}

/// Everything Lotline consumes from the ledger.
pub trait Ledger: StateStore + QueryStore + HistoryStore {}

impl<T: StateStore + QueryStore + HistoryStore + ?Sized> Ledger for T {}

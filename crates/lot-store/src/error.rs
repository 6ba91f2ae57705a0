/// Errors from ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Keys must be non-empty strings.
    #[error("key must not be empty")]
    EmptyKey,

    /// The selector query could not be parsed or uses unsupported operators.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A key read by the committing transaction changed before its commit.
    #[error("read conflict on key {0}: modified by a concurrent transaction")]
    ReadConflict(String),

    /// A cursor was read after it had been closed.
    #[error("cursor already closed")]
    CursorClosed,

    /// The backend could not serve the request.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

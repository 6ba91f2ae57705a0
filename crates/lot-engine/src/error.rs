use lot_model::ModelError;
use lot_store::StoreError;
use lot_types::EntityKind;

/// Errors produced by lifecycle, query and history operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Wrong argument count or malformed input. Raised before any ledger access.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{kind} already exists: {id}")]
    Conflict { kind: EntityKind, id: String },

    #[error("{kind} does not exist: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A document could not be parsed or produced.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// The ledger call itself failed; the message is passed through unchanged.
    #[error("{0}")]
    Backend(#[from] StoreError),
}

impl From<ModelError> for EngineError {
    fn from(err: ModelError) -> Self {
        if err.is_validation() {
            Self::Validation(err.to_string())
        } else {
            Self::Serialization(err.to_string())
        }
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

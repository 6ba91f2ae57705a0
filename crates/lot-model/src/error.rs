use lot_types::{EntityKind, TypeError};

use crate::field::Field;

/// Errors produced while building, parsing or mutating entities.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("incorrect number of arguments for {kind}: expected {expected}, got {actual}")]
    ArgumentCount {
        kind: EntityKind,
        expected: usize,
        actual: usize,
    },

    #[error("invalid argument {name}: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error("document has no docType discriminator")]
    MissingKind,

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("expected a {expected} document, found {actual}")]
    KindMismatch {
        expected: EntityKind,
        actual: EntityKind,
    },

    #[error("field {field} does not belong to {kind} documents")]
    FieldMismatch { field: Field, kind: EntityKind },

    #[error("malformed document: {0}")]
    Malformed(String),
}

impl ModelError {
    /// Whether the error describes bad caller input rather than bad stored data.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ArgumentCount { .. } | Self::InvalidArgument { .. } | Self::FieldMismatch { .. }
        )
    }
}

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

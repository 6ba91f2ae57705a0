/// Errors raised while building or loading dispatch configuration.
///
/// Failures of individual invocations never surface as `DispatchError`; the
/// dispatcher turns them into [`Response::Failure`](crate::Response::Failure).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The operation table could not be parsed.
    #[error("invalid operation table: {0}")]
    Table(#[from] toml::de::Error),

    /// The operation table parsed but is unusable.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

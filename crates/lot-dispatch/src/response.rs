/// Status code of a successful invocation.
pub const OK: u16 = 200;

/// Status code of a failed invocation.
pub const ERROR: u16 = 500;

/// Outcome of one invocation as seen by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// The operation succeeded. Writes carry an empty payload.
    Success { payload: Vec<u8> },
    /// The operation failed and nothing was written.
    Failure { message: String },
}

impl Response {
    pub fn success(payload: Vec<u8>) -> Self {
        Self::Success { payload }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { .. } => OK,
            Self::Failure { .. } => ERROR,
        }
    }

    /// Payload bytes of a success, `None` on failure.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Self::Success { payload } => Some(payload),
            Self::Failure { .. } => None,
        }
    }

    /// Failure message, `None` on success.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { message } => Some(message),
        }
    }

    /// The payload parsed as JSON, if it is non-empty valid JSON.
    pub fn payload_json(&self) -> Option<serde_json::Value> {
        self.payload()
            .filter(|p| !p.is_empty())
            .and_then(|p| serde_json::from_slice(p).ok())
    }
}

use thiserror::Error;

/// Failures of an admin API call. `Display` is the operator-facing message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response within the configured timeout.
    #[error("Request timeout. Please check your connection and try again.")]
    Timeout,
    /// The request never reached the server or the connection broke.
    #[error("Unable to connect to server: {0}")]
    Network(String),
    /// The server answered with a non-success status, or with a success body
    /// that could not be decoded.
    #[error("{message}")]
    Api { status: u16, message: String },
    /// Caller input rejected before any request was made.
    #[error("Invalid request: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// HTTP status of an API error, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

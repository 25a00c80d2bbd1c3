use crate::session::storage::StorageError;
use thiserror::Error;

/// Login failures. `Display` is the message shown to the operator.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The backend answered 2xx without a usable admin and token.
    #[error("Invalid response from server")]
    InvalidResponse,
    /// Every candidate base URL failed at the transport level.
    #[error("Unable to connect to backend server: {last}")]
    Unreachable { last: String },
    #[error("No backend URL configured")]
    NoCandidates,
    #[error("Failed to initialize HTTP client: {0}")]
    Client(String),
    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),
}

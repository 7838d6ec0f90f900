use thiserror::Error;

/// Failure talking to the search/booking backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend rejected the request: {0}")]
    Rejected(String),

    #[error("malformed backend response: {0}")]
    Decode(String),
}

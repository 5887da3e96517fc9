use reqwest::StatusCode;
use thiserror::Error;

/// Everything the remote service (or its absence) can do to us. All of these
/// are caught at the call site nearest the user action and rendered as a
/// notice; none are fatal.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("login required")]
    AuthRequired,
    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("conversation {0} does not belong to this backend")]
    InvalidConversationId(i64),
    #[error("storage error: {0}")]
    Storage(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

use shared::{domain::AttemptId, error::ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to contact endpoint failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("contact endpoint responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to read contact endpoint response: {0}")]
    Body(#[source] reqwest::Error),
    #[error("invalid attachment mime type '{mime_type}': {source}")]
    InvalidMime {
        mime_type: String,
        source: reqwest::Error,
    },
    #[error("send task ended before delivering a result")]
    Aborted,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("submission {attempt} is still in flight")]
    InFlight { attempt: AttemptId },
}

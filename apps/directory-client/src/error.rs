use platform_api::{ErrorBody, ErrorCode};
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failures the controller surfaces to the view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("network failure: {0}")]
    Transport(String),
    #[error("no dialog is open")]
    NoOpenDialog,
}

impl ClientError {
    /// Classify a non-success response by status, keeping the server's message when present.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok();
        let message = parsed
            .as_ref()
            .map(|body| body.error.message.clone())
            .unwrap_or_else(|| format!("unexpected status {status}"));
        match (status, parsed.map(|body| body.error.code)) {
            (400 | 422, _) | (_, Some(ErrorCode::Validation)) => Self::Validation(message),
            (404, _) | (_, Some(ErrorCode::NotFound)) => Self::NotFound(message),
            _ => Self::Transport(message),
        }
    }
}

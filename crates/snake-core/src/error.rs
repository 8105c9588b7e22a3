use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("game not started")]
    NotStarted,
    #[error("unknown id: {0}")]
    UnknownId(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("asset path escapes web root: {0}")]
    PathOutsideRoot(String),
    #[error("score table io failed: {0}")]
    Io(#[from] io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

use std::io;

use thiserror::Error;

/// Errors surfaced by the runner library.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("property `{key}` has invalid value `{value}`: expected {expected}")]
    InvalidProperty {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("upload transport failed: {0}")]
    Upload(#[from] reqwest::Error),

    #[error("upload rejected with HTTP {status}: {body}")]
    UploadRejected { status: u16, body: String },

    #[error("sealed report rejected: {0}")]
    Seal(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;

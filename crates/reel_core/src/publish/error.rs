//! Errors from uploading the final video.

use std::time::Duration;

use thiserror::Error;

/// Publish failures are not fatal: the session ends as `PublishFailed`.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Upload request failed: {0}")]
    Transport(String),

    #[error("{stage} returned HTTP {status}")]
    Status { stage: &'static str, status: u16 },

    /// The host answered but reported a non-ok status.
    #[error("{stage} was rejected with status '{status}'{}", fmt_detail(.detail))]
    Rejected {
        stage: &'static str,
        status: String,
        detail: Option<String>,
    },

    #[error("Unexpected {stage} response: {message}")]
    InvalidResponse { stage: &'static str, message: String },

    #[error("I/O error reading upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload did not finish within {0:?}")]
    Timeout(Duration),
}

impl PublishError {
    pub fn invalid_response(stage: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            stage,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}

pub type PublishResult<T> = Result<T, PublishError>;

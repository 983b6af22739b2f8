//! Errors from fetching one scene's footage or voiceover.
//!
//! These never abort a session: the fetcher folds them into a
//! [`DropReason`](crate::models::DropReason) for the scene.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetFetchError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    /// The search returned nothing for the keyword and the fallback.
    #[error("No footage found for '{keyword}'")]
    NoResults { keyword: String },

    /// A result was found but it lists no downloadable files.
    #[error("Footage result for '{keyword}' has no video files")]
    NoVariants { keyword: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Speech synthesis produced nothing usable.
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
}

impl AssetFetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn status(status: reqwest::StatusCode, url: impl Into<String>) -> Self {
        Self::Status {
            status: status.as_u16(),
            url: url.into(),
        }
    }
}

impl From<reqwest::Error> for AssetFetchError {
    fn from(err: reqwest::Error) -> Self {
        // Keep query strings (and keys in them) out of logs
        Self::Transport(err.without_url().to_string())
    }
}

pub type AssetFetchResult<T> = Result<T, AssetFetchError>;

//! Errors from the script stage. Any of them aborts the session.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    /// No API key configured for the text model.
    #[error("Text model API key is not configured")]
    MissingApiKey,

    /// The HTTP request could not be completed.
    #[error("Text model request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Text model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service reported an error in its payload.
    #[error("Text model error: {0}")]
    Api(String),

    /// The model call did not finish in time.
    #[error("Text model did not answer within {0:?}")]
    Timeout(Duration),

    /// The response held no text.
    #[error("Text model returned no content")]
    EmptyResponse,

    /// The text was not the expected JSON document.
    #[error("Failed to parse script: {0}")]
    Parse(String),

    /// The script parsed but contains no scenes.
    #[error("Script contains no scenes")]
    EmptyScript,

    /// A scene is missing its voiceover or keyword.
    #[error("Scene {index} is invalid: {reason}")]
    InvalidScene { index: usize, reason: String },
}

impl GenerationError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    pub fn invalid_scene(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidScene {
            index,
            reason: reason.into(),
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL may carry credentials; keep it out of the message.
        Self::Transport(err.without_url().to_string())
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;

//! Errors from probing and rendering.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Any of these aborts the session.
#[derive(Error, Debug)]
pub enum MediaError {
    /// Assembly was asked to render zero clips.
    #[error("No clips to assemble")]
    EmptySequence,

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to probe {path}: {message}")]
    Probe { path: PathBuf, message: String },

    #[error("Invalid duration {value} for {path}")]
    InvalidDuration { path: PathBuf, value: f64 },

    /// The clip is shorter than its narration and the policy forbids filling.
    #[error("Scene {index} video is {video_duration:.2}s but {required:.2}s is required")]
    VideoTooShort {
        index: usize,
        video_duration: f64,
        required: f64,
    },

    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    #[error("{tool} did not finish within {limit:?}")]
    Timeout { tool: String, limit: Duration },

    #[error("Expected output was not produced: {0}")]
    MissingOutput(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl MediaError {
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    pub fn probe(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub type MediaResult<T> = Result<T, MediaError>;

//! Error types for session runs and the session queue.
//!
//! Stage errors are wrapped with the session id so log lines can be
//! correlated: Session → Stage → Detail.

use thiserror::Error;

use crate::media::MediaError;
use crate::models::SessionId;
use crate::publish::PublishError;
use crate::script::GenerationError;

/// A stage failure inside one session.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Session {session_id}: script generation failed: {source}")]
    Script {
        session_id: SessionId,
        #[source]
        source: GenerationError,
    },

    #[error("Session {session_id}: none of {planned} scenes produced usable assets")]
    NoAssets { session_id: SessionId, planned: usize },

    #[error("Session {session_id}: media processing failed: {source}")]
    Media {
        session_id: SessionId,
        #[source]
        source: MediaError,
    },

    #[error("Session {session_id}: publishing failed: {source}")]
    Publish {
        session_id: SessionId,
        #[source]
        source: PublishError,
    },
}

impl PipelineError {
    pub fn script(session_id: &SessionId, source: GenerationError) -> Self {
        Self::Script {
            session_id: session_id.clone(),
            source,
        }
    }

    pub fn no_assets(session_id: &SessionId, planned: usize) -> Self {
        Self::NoAssets {
            session_id: session_id.clone(),
            planned,
        }
    }

    pub fn media(session_id: &SessionId, source: MediaError) -> Self {
        Self::Media {
            session_id: session_id.clone(),
            source,
        }
    }

    pub fn publish(session_id: &SessionId, source: PublishError) -> Self {
        Self::Publish {
            session_id: session_id.clone(),
            source,
        }
    }
}

/// Why a topic could not be queued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Session queue is full ({capacity} waiting)")]
    QueueFull { capacity: usize },

    #[error("Session queue is shut down")]
    Closed,
}

//! Session identity, lifecycle states and outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique token for one session, used as the artifact filename prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filename stem for a scene artifact: `temp_{id}_{index}`.
    pub fn scene_prefix(&self, index: usize) -> String {
        format!("temp_{}_{}", self.0, index)
    }

    /// Filename of the assembled output: `final_{id}.mp4`.
    pub fn output_file_name(&self) -> String {
        format!("final_{}.mp4", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a session.
///
/// ```text
/// Started -> Scripted -> AssetsCollected -> Assembled -> Published -> Cleaned
///    |          |              |                |
///    v          v              v                v
/// AbortedNoScript  AbortedNoAssets  AbortedMedia  PublishFailed   (all -> Cleaned)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Started,
    Scripted,
    AssetsCollected,
    Assembled,
    Published,
    AbortedNoScript,
    AbortedNoAssets,
    AbortedMedia,
    PublishFailed,
    Cleaned,
}

impl SessionState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        if next == Cleaned {
            return self != Cleaned;
        }
        matches!(
            (self, next),
            (Started, Scripted)
                | (Started, AbortedNoScript)
                | (Scripted, AssetsCollected)
                | (Scripted, AbortedNoAssets)
                | (AssetsCollected, Assembled)
                | (AssetsCollected, AbortedMedia)
                | (Assembled, Published)
                | (Assembled, PublishFailed)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Started => "STARTED",
            SessionState::Scripted => "SCRIPTED",
            SessionState::AssetsCollected => "ASSETS_COLLECTED",
            SessionState::Assembled => "ASSEMBLED",
            SessionState::Published => "PUBLISHED",
            SessionState::AbortedNoScript => "ABORTED_NO_SCRIPT",
            SessionState::AbortedNoAssets => "ABORTED_NO_ASSETS",
            SessionState::AbortedMedia => "ABORTED_MEDIA",
            SessionState::PublishFailed => "PUBLISH_FAILED",
            SessionState::Cleaned => "CLEANED",
        };
        f.write_str(name)
    }
}

/// How a session ended, as reported to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Video produced and uploaded.
    Published { download_url: String },
    /// Video produced but the upload failed.
    PublishFailed { reason: String },
    /// Script generation failed.
    AbortedNoScript { reason: String },
    /// No scene produced both a video and an audio file.
    AbortedNoAssets,
    /// Synchronization or assembly failed.
    AbortedMedia { reason: String },
}

impl SessionOutcome {
    pub fn download_url(&self) -> Option<&str> {
        match self {
            SessionOutcome::Published { download_url } => Some(download_url),
            _ => None,
        }
    }

    /// The state the session was in right before cleanup.
    pub fn final_state(&self) -> SessionState {
        match self {
            SessionOutcome::Published { .. } => SessionState::Published,
            SessionOutcome::PublishFailed { .. } => SessionState::PublishFailed,
            SessionOutcome::AbortedNoScript { .. } => SessionState::AbortedNoScript,
            SessionOutcome::AbortedNoAssets => SessionState::AbortedNoAssets,
            SessionOutcome::AbortedMedia { .. } => SessionState::AbortedMedia,
        }
    }
}

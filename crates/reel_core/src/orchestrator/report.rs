//! The outcome record of one session.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::models::{DropReason, SessionId, SessionOutcome, SessionState};

/// A scene that did not make it into the video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedScene {
    pub index: usize,
    pub search_keyword: String,
    pub reason: DropReason,
}

/// Everything observable about a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: SessionId,
    pub topic: String,
    /// Every state the session passed through, ending with `Cleaned`.
    pub states: Vec<SessionState>,
    pub outcome: SessionOutcome,
    pub scenes_planned: usize,
    /// Indices of the scenes in the video, in order.
    pub scenes_used: Vec<usize>,
    pub dropped: Vec<DroppedScene>,
    pub download_url: Option<String>,
    pub removed_files: Vec<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub elapsed: Duration,
}

impl SessionReport {
    pub fn final_state(&self) -> Option<SessionState> {
        self.states.last().copied()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        let result = match &self.outcome {
            SessionOutcome::Published { download_url } => format!("published at {}", download_url),
            SessionOutcome::PublishFailed { reason } => format!("upload failed ({})", reason),
            SessionOutcome::AbortedNoScript { reason } => format!("no script ({})", reason),
            SessionOutcome::AbortedNoAssets => "no usable scenes".to_string(),
            SessionOutcome::AbortedMedia { reason } => format!("media failed ({})", reason),
        };
        format!(
            "Session {} '{}': {}; {}/{} scenes used, {} temp files removed in {:.1}s",
            self.session_id,
            self.topic,
            result,
            self.scenes_used.len(),
            self.scenes_planned,
            self.removed_files.len(),
            self.elapsed.as_secs_f64()
        )
    }
}

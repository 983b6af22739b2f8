//! State carried through one session run.

use super::temp_files::TempFiles;
use crate::logging::SessionLogger;
use crate::models::{SceneAssets, SceneDescriptor, SessionId, SessionState};

/// One topic's trip through the pipeline.
pub struct Session {
    pub id: SessionId,
    pub topic: String,
    pub scenes: Vec<SceneDescriptor>,
    /// Scenes with both files, in script order.
    pub assets: Vec<SceneAssets>,
    pub temp_files: TempFiles,
    pub logger: SessionLogger,
    states: Vec<SessionState>,
}

impl Session {
    pub fn new(id: SessionId, topic: impl Into<String>, logger: SessionLogger) -> Self {
        Self {
            id,
            topic: topic.into(),
            scenes: Vec::new(),
            assets: Vec::new(),
            temp_files: TempFiles::new(),
            logger,
            states: vec![SessionState::Started],
        }
    }

    pub fn state(&self) -> SessionState {
        // Never empty: starts with `Started`
        self.states.last().copied().unwrap_or(SessionState::Started)
    }

    pub fn states(&self) -> &[SessionState] {
        &self.states
    }

    /// Move to `next` if the lifecycle allows it.
    ///
    /// Returns false (and records nothing) for an illegal move.
    pub fn transition(&mut self, next: SessionState) -> bool {
        let current = self.state();
        if !current.can_transition_to(next) {
            self.logger
                .error(&format!("Illegal state change {} -> {}", current, next));
            return false;
        }
        self.logger.debug(&format!("State {} -> {}", current, next));
        self.states.push(next);
        true
    }
}

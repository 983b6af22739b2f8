//! Scene-level types: the script entries and what fetching produced.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One unit of the script: a voiceover line and a footage search hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    /// Narration text in the target spoken language.
    pub voiceover: String,
    /// Short stock footage search keyword.
    pub search_keyword: String,
}

impl SceneDescriptor {
    pub fn new(voiceover: impl Into<String>, search_keyword: impl Into<String>) -> Self {
        Self {
            voiceover: voiceover.into(),
            search_keyword: search_keyword.into(),
        }
    }

    /// Both fields carry non-whitespace text.
    pub fn is_well_formed(&self) -> bool {
        !self.voiceover.trim().is_empty() && !self.search_keyword.trim().is_empty()
    }
}

/// Files produced for one scene whose video and audio both succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneAssets {
    /// Position of the scene in the script (0-based).
    pub index: usize,
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
}

/// Why a scene was left out of the final video.
///
/// Each side carries the rendered `AssetFetchError` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    MissingVideo(String),
    MissingAudio(String),
    MissingBoth { video: String, audio: String },
}

impl DropReason {
    /// Build a drop reason from the two sub-operation results.
    ///
    /// Returns `None` when both sides succeeded.
    pub fn from_sides(video: Option<String>, audio: Option<String>) -> Option<Self> {
        match (video, audio) {
            (None, None) => None,
            (Some(video), None) => Some(DropReason::MissingVideo(video)),
            (None, Some(audio)) => Some(DropReason::MissingAudio(audio)),
            (Some(video), Some(audio)) => Some(DropReason::MissingBoth { video, audio }),
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingVideo(e) => write!(f, "no video: {}", e),
            DropReason::MissingAudio(e) => write!(f, "no audio: {}", e),
            DropReason::MissingBoth { video, audio } => {
                write!(f, "no video: {}; no audio: {}", video, audio)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_not_well_formed() {
        assert!(SceneDescriptor::new("Biển xanh", "ocean waves").is_well_formed());
        assert!(!SceneDescriptor::new("  ", "ocean").is_well_formed());
        assert!(!SceneDescriptor::new("text", "").is_well_formed());
    }

    #[test]
    fn drop_reason_from_sides() {
        assert_eq!(DropReason::from_sides(None, None), None);
        assert_eq!(
            DropReason::from_sides(Some("no results".into()), None),
            Some(DropReason::MissingVideo("no results".into()))
        );
        let both = DropReason::from_sides(Some("a".into()), Some("b".into())).unwrap();
        assert_eq!(both.to_string(), "no video: a; no audio: b");
    }
}

//! Pairing a scene's footage with its narration.
//!
//! A clip always lasts as long as its narration plus the trailing padding.
//! Longer footage is trimmed; shorter footage is filled according to the
//! configured [`ShortVideoPolicy`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::{MediaError, MediaResult};
use crate::config::ShortVideoPolicy;

/// How the source video covers the clip duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClipFill {
    /// Video is at least as long as the clip; cut at `duration`.
    Trim,
    /// Hold the last frame for `extra_secs`.
    Freeze { extra_secs: f64 },
    /// Repeat the source until `duration` is reached.
    Loop,
}

/// Render description of one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynchronizedClip {
    pub index: usize,
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    pub audio_duration: f64,
    pub video_duration: f64,
    /// Narration length plus trailing padding.
    pub duration: f64,
    pub fill: ClipFill,
}

/// Measured inputs of [`plan_clip`].
#[derive(Debug, Clone)]
pub struct ClipSource {
    pub index: usize,
    pub video_path: PathBuf,
    pub audio_path: PathBuf,
    pub video_duration: f64,
    pub audio_duration: f64,
}

/// Decide the clip length and fill from probed durations.
pub fn plan_clip(
    source: ClipSource,
    trailing_padding: f64,
    policy: ShortVideoPolicy,
) -> MediaResult<SynchronizedClip> {
    if !source.audio_duration.is_finite() || source.audio_duration <= 0.0 {
        return Err(MediaError::InvalidDuration {
            path: source.audio_path,
            value: source.audio_duration,
        });
    }
    if !source.video_duration.is_finite() || source.video_duration <= 0.0 {
        return Err(MediaError::InvalidDuration {
            path: source.video_path,
            value: source.video_duration,
        });
    }

    let duration = source.audio_duration + trailing_padding.max(0.0);

    let fill = if source.video_duration >= duration {
        ClipFill::Trim
    } else {
        match policy {
            ShortVideoPolicy::FreezeLastFrame => ClipFill::Freeze {
                extra_secs: duration - source.video_duration,
            },
            ShortVideoPolicy::Loop => ClipFill::Loop,
            ShortVideoPolicy::Fail => {
                return Err(MediaError::VideoTooShort {
                    index: source.index,
                    video_duration: source.video_duration,
                    required: duration,
                })
            }
        }
    };

    Ok(SynchronizedClip {
        index: source.index,
        video_path: source.video_path,
        audio_path: source.audio_path,
        audio_duration: source.audio_duration,
        video_duration: source.video_duration,
        duration,
        fill,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(video: f64, audio: f64) -> ClipSource {
        ClipSource {
            index: 2,
            video_path: PathBuf::from("temp_s_2_video.mp4"),
            audio_path: PathBuf::from("temp_s_2_audio.mp3"),
            video_duration: video,
            audio_duration: audio,
        }
    }

    #[test]
    fn duration_is_audio_plus_padding() {
        let clip = plan_clip(source(15.0, 8.0), 1.0, ShortVideoPolicy::default()).unwrap();
        assert_eq!(clip.duration, 9.0);
        assert_eq!(clip.fill, ClipFill::Trim);
        assert_eq!(clip.index, 2);
    }

    #[test]
    fn exact_length_video_is_trimmed() {
        let clip = plan_clip(source(9.0, 8.0), 1.0, ShortVideoPolicy::Fail).unwrap();
        assert_eq!(clip.fill, ClipFill::Trim);
    }

    #[test]
    fn short_video_freezes_by_default() {
        let clip = plan_clip(source(5.0, 8.0), 1.0, ShortVideoPolicy::default()).unwrap();
        assert_eq!(clip.fill, ClipFill::Freeze { extra_secs: 4.0 });
        assert_eq!(clip.duration, 9.0);
    }

    #[test]
    fn short_video_can_loop() {
        let clip = plan_clip(source(5.0, 8.0), 1.0, ShortVideoPolicy::Loop).unwrap();
        assert_eq!(clip.fill, ClipFill::Loop);
    }

    #[test]
    fn short_video_can_fail() {
        let err = plan_clip(source(5.0, 8.0), 1.0, ShortVideoPolicy::Fail).unwrap_err();
        assert!(matches!(
            err,
            MediaError::VideoTooShort { index: 2, .. }
        ));
    }

    #[test]
    fn zero_audio_is_invalid() {
        let err = plan_clip(source(5.0, 0.0), 1.0, ShortVideoPolicy::default()).unwrap_err();
        assert!(matches!(err, MediaError::InvalidDuration { .. }));
    }
}

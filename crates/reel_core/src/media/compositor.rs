//! The media seam used by the orchestrator.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::assemble::{build_ffmpeg_args, RenderOptions};
use super::error::{MediaError, MediaResult};
use super::ffmpeg::FfmpegTools;
use super::sync::{plan_clip, ClipSource, SynchronizedClip};
use crate::config::{MediaSettings, ShortVideoPolicy};
use crate::logging::SessionLogger;
use crate::models::SceneAssets;

/// Synchronizes scene files into clips and renders clip sequences.
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Measure one scene's files and describe the clip they make.
    async fn sync(
        &self,
        assets: &SceneAssets,
        logger: &SessionLogger,
    ) -> MediaResult<SynchronizedClip>;

    /// Render `clips` in order into `output`.
    async fn assemble(
        &self,
        clips: &[SynchronizedClip],
        output: &Path,
        logger: &SessionLogger,
    ) -> MediaResult<PathBuf>;
}

/// [`Compositor`] backed by ffprobe and ffmpeg.
pub struct FfmpegCompositor {
    tools: FfmpegTools,
    render: RenderOptions,
    trailing_padding: f64,
    policy: ShortVideoPolicy,
}

impl FfmpegCompositor {
    pub fn new(settings: &MediaSettings) -> Self {
        Self {
            tools: FfmpegTools::new(settings),
            render: RenderOptions::from(settings),
            trailing_padding: settings.trailing_padding_secs,
            policy: settings.short_video_policy,
        }
    }
}

#[async_trait]
impl Compositor for FfmpegCompositor {
    async fn sync(
        &self,
        assets: &SceneAssets,
        logger: &SessionLogger,
    ) -> MediaResult<SynchronizedClip> {
        let (video_duration, audio_duration) = tokio::try_join!(
            self.tools.probe_duration(&assets.video_path),
            self.tools.probe_duration(&assets.audio_path),
        )?;

        let clip = plan_clip(
            ClipSource {
                index: assets.index,
                video_path: assets.video_path.clone(),
                audio_path: assets.audio_path.clone(),
                video_duration,
                audio_duration,
            },
            self.trailing_padding,
            self.policy,
        )?;

        logger.debug(&format!(
            "Scene {}: audio {:.2}s, video {:.2}s -> clip {:.2}s ({:?})",
            clip.index, audio_duration, video_duration, clip.duration, clip.fill
        ));
        Ok(clip)
    }

    async fn assemble(
        &self,
        clips: &[SynchronizedClip],
        output: &Path,
        logger: &SessionLogger,
    ) -> MediaResult<PathBuf> {
        let args = build_ffmpeg_args(clips, output, &self.render)?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        self.tools.run_ffmpeg(&args, logger).await?;

        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.len() > 0 => Ok(output.to_path_buf()),
            _ => Err(MediaError::MissingOutput(output.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;

    #[tokio::test]
    async fn assemble_empty_fails_before_running_ffmpeg() {
        let settings = MediaSettings {
            ffmpeg_path: "reelforge-no-such-ffmpeg".to_string(),
            ..MediaSettings::default()
        };
        let compositor = FfmpegCompositor::new(&settings);
        let logger = SessionLogger::detached("t", LogConfig::default());

        let err = compositor
            .assemble(&[], Path::new("final_t.mp4"), &logger)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::EmptySequence));
    }

    #[tokio::test]
    async fn sync_missing_files_is_media_error() {
        let compositor = FfmpegCompositor::new(&MediaSettings::default());
        let logger = SessionLogger::detached("t", LogConfig::default());
        let assets = SceneAssets {
            index: 0,
            video_path: PathBuf::from("/no/such/temp_t_0_video.mp4"),
            audio_path: PathBuf::from("/no/such/temp_t_0_audio.mp3"),
        };

        let err = compositor.sync(&assets, &logger).await.unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}

//! Running ffmpeg and ffprobe as child processes.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use tokio::process::Command;

use super::error::{MediaError, MediaResult};
use crate::config::MediaSettings;
use crate::logging::SessionLogger;

/// Locations and limits for the external media tools.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: String,
    ffprobe: String,
    encode_timeout: Duration,
    probe_timeout: Duration,
}

impl FfmpegTools {
    pub fn new(settings: &MediaSettings) -> Self {
        Self {
            ffmpeg: settings.ffmpeg_path.clone(),
            ffprobe: settings.ffprobe_path.clone(),
            encode_timeout: settings.timeout(),
            probe_timeout: settings.probe_timeout(),
        }
    }

    /// Get the duration of a media file in seconds.
    pub async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let mut cmd = Command::new(&self.ffprobe);
        cmd.arg("-v")
            .arg("error")
            .arg("-show_entries")
            .arg("format=duration")
            .arg("-of")
            .arg("default=noprint_wrappers=1:nokey=1")
            .arg(path);

        let output = run(&mut cmd, &self.ffprobe, self.probe_timeout).await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::probe(path, stderr.trim()));
        }

        parse_duration(path, &String::from_utf8_lossy(&output.stdout))
    }

    /// Run ffmpeg with `args`, feeding its output into the session tail buffer.
    pub async fn run_ffmpeg(&self, args: &[String], logger: &SessionLogger) -> MediaResult<()> {
        logger.command(&format!("{} {}", self.ffmpeg, args.join(" ")));

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(args);

        let output = match run(&mut cmd, &self.ffmpeg, self.encode_timeout).await {
            Ok(output) => output,
            Err(e) => {
                logger.error(&e.to_string());
                return Err(e);
            }
        };
        let exit_code = output.status.code().unwrap_or(-1);

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            logger.output_line(line, false);
        }
        for line in stderr.lines() {
            logger.output_line(line, true);
        }

        if !output.status.success() {
            logger.show_tail("ffmpeg output");
            let last = stderr.lines().last().unwrap_or("").to_string();
            return Err(MediaError::command_failed("ffmpeg", exit_code, last));
        }

        Ok(())
    }
}

/// Spawn a command and wait for it, killing it when the limit expires.
async fn run(cmd: &mut Command, tool: &str, limit: Duration) -> MediaResult<Output> {
    cmd.kill_on_drop(true);
    tracing::debug!("Running {:?}", cmd);

    match tokio::time::timeout(limit, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(MediaError::Spawn {
            tool: tool.to_string(),
            source,
        }),
        Err(_) => Err(MediaError::Timeout {
            tool: tool.to_string(),
            limit,
        }),
    }
}

/// Parse ffprobe's bare `format=duration` output.
fn parse_duration(path: &Path, stdout: &str) -> MediaResult<f64> {
    let text = stdout.trim();
    let value: f64 = text
        .parse()
        .map_err(|_| MediaError::probe(path, format!("unreadable duration '{}'", text)))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(MediaError::InvalidDuration {
            path: path.to_path_buf(),
            value,
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogConfig;

    #[test]
    fn parses_probe_output() {
        let d = parse_duration(Path::new("a.mp3"), "12.345000\n").unwrap();
        assert!((d - 12.345).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(matches!(
            parse_duration(Path::new("a.mp4"), "N/A"),
            Err(MediaError::Probe { .. })
        ));
        assert!(matches!(
            parse_duration(Path::new("a.mp4"), "0.000000"),
            Err(MediaError::InvalidDuration { .. })
        ));
        assert!(matches!(
            parse_duration(Path::new("a.mp4"), "-3"),
            Err(MediaError::InvalidDuration { .. })
        ));
    }

    #[tokio::test]
    async fn probe_missing_file_is_not_found() {
        let tools = FfmpegTools::new(&MediaSettings::default());
        let err = tools
            .probe_duration(Path::new("/definitely/not/here.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let settings = MediaSettings {
            ffmpeg_path: "reelforge-no-such-ffmpeg".to_string(),
            ..MediaSettings::default()
        };
        let tools = FfmpegTools::new(&settings);
        let logger = SessionLogger::detached("t", LogConfig::default());

        let err = tools.run_ffmpeg(&["-version".to_string()], &logger).await.unwrap_err();
        assert!(matches!(err, MediaError::Spawn { .. }));
    }
}

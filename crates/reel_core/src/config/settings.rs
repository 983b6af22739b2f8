//! Settings struct with TOML-based sections.
//!
//! Settings are organized into one table per pipeline stage. Every key has
//! a default so a partial (or empty) file is always valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Working and log directories.
    #[serde(default)]
    pub paths: PathSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Script generation (text model) settings.
    #[serde(default)]
    pub script: ScriptSettings,

    /// Stock footage search settings.
    #[serde(default)]
    pub footage: FootageSettings,

    /// Speech synthesis settings.
    #[serde(default)]
    pub speech: SpeechSettings,

    /// File hosting settings.
    #[serde(default)]
    pub publish: PublishSettings,

    /// ffmpeg rendering settings.
    #[serde(default)]
    pub media: MediaSettings,

    /// Per-session pipeline behavior.
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// HTTP front end and worker pool.
    #[serde(default)]
    pub server: ServerSettings,
}

impl Settings {
    /// Section names recognized in the TOML file.
    pub const SECTIONS: [&'static str; 9] = [
        "paths", "logging", "script", "footage", "speech", "publish", "media", "pipeline",
        "server",
    ];
}

/// Path configuration for temp artifacts and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Root folder for per-session temporary files.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for per-session log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_temp_root() -> String {
    ".temp".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for session logs and the global subscriber.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep ffmpeg output out of the session log unless a command fails.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines to show on error (tail).
    #[serde(default = "default_error_tail")]
    pub error_tail: usize,

    /// Write one log file per session under `paths.logs_folder`.
    #[serde(default = "default_true")]
    pub session_files: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> usize {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
            session_files: true,
        }
    }
}

/// Script generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSettings {
    /// Text generation API base URL.
    #[serde(default = "default_script_endpoint")]
    pub endpoint: String,

    /// Model name.
    #[serde(default = "default_script_model")]
    pub model: String,

    /// Number of scenes requested from the model.
    #[serde(default = "default_scene_count")]
    pub scene_count: u32,

    /// Lower bound of the voiceover length, in words.
    #[serde(default = "default_min_words")]
    pub min_words: u32,

    /// Upper bound of the voiceover length, in words.
    #[serde(default = "default_max_words")]
    pub max_words: u32,

    /// Language the voiceover is written in (used in the prompt).
    #[serde(default = "default_narration_language")]
    pub narration_language: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_script_timeout")]
    pub timeout_secs: u64,
}

fn default_script_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_script_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_scene_count() -> u32 {
    4
}

fn default_min_words() -> u32 {
    20
}

fn default_max_words() -> u32 {
    30
}

fn default_narration_language() -> String {
    "Vietnamese".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_script_timeout() -> u64 {
    60
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            endpoint: default_script_endpoint(),
            model: default_script_model(),
            scene_count: default_scene_count(),
            min_words: default_min_words(),
            max_words: default_max_words(),
            narration_language: default_narration_language(),
            temperature: default_temperature(),
            timeout_secs: default_script_timeout(),
        }
    }
}

impl ScriptSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Stock footage search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootageSettings {
    /// Stock footage API base URL.
    #[serde(default = "default_footage_endpoint")]
    pub endpoint: String,

    /// Keyword used when the scene keyword has no results.
    #[serde(default = "default_fallback_keyword")]
    pub fallback_keyword: String,

    /// Results requested per search.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Timeout for one search or one download, in seconds.
    #[serde(default = "default_footage_timeout")]
    pub timeout_secs: u64,
}

fn default_footage_endpoint() -> String {
    "https://api.pexels.com".to_string()
}

fn default_fallback_keyword() -> String {
    "nature".to_string()
}

fn default_per_page() -> u32 {
    1
}

fn default_footage_timeout() -> u64 {
    120
}

impl Default for FootageSettings {
    fn default() -> Self {
        Self {
            endpoint: default_footage_endpoint(),
            fallback_keyword: default_fallback_keyword(),
            per_page: default_per_page(),
            timeout_secs: default_footage_timeout(),
        }
    }
}

impl FootageSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Speech endpoint URL.
    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,

    /// Spoken language code.
    #[serde(default = "default_speech_language")]
    pub language: String,

    /// Read the text slowly.
    #[serde(default)]
    pub slow: bool,

    /// Timeout for synthesizing one voiceover, in seconds.
    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,
}

fn default_speech_endpoint() -> String {
    "https://translate.google.com/translate_tts".to_string()
}

fn default_speech_language() -> String {
    "vi".to_string()
}

fn default_speech_timeout() -> u64 {
    60
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            endpoint: default_speech_endpoint(),
            language: default_speech_language(),
            slow: false,
            timeout_secs: default_speech_timeout(),
        }
    }
}

impl SpeechSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// File hosting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSettings {
    /// Hosting API base URL (server allocation).
    #[serde(default = "default_publish_endpoint")]
    pub endpoint: String,

    /// Upload URL with a `{server}` placeholder.
    #[serde(default = "default_upload_url_template")]
    pub upload_url_template: String,

    /// Timeout for the whole publish (allocation + upload), in seconds.
    #[serde(default = "default_publish_timeout")]
    pub timeout_secs: u64,
}

fn default_publish_endpoint() -> String {
    "https://api.gofile.io".to_string()
}

fn default_upload_url_template() -> String {
    "https://{server}.gofile.io/uploadFile".to_string()
}

fn default_publish_timeout() -> u64 {
    600
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            endpoint: default_publish_endpoint(),
            upload_url_template: default_upload_url_template(),
            timeout_secs: default_publish_timeout(),
        }
    }
}

impl PublishSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What to do when the stock clip is shorter than the narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortVideoPolicy {
    /// Hold the last frame until the narration ends.
    #[default]
    FreezeLastFrame,
    /// Loop the source clip.
    Loop,
    /// Treat the scene as a media error.
    Fail,
}

/// ffmpeg rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSettings {
    /// ffmpeg executable.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    /// ffprobe executable.
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,

    /// Seconds of padding appended after each narration.
    #[serde(default = "default_trailing_padding")]
    pub trailing_padding_secs: f64,

    /// Output video codec.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Output audio codec.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Output canvas width.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Output canvas height.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Output frame rate.
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Output audio sample rate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Policy for clips shorter than their narration.
    #[serde(default)]
    pub short_video_policy: ShortVideoPolicy,

    /// Timeout for the assembly encode, in seconds.
    #[serde(default = "default_media_timeout")]
    pub timeout_secs: u64,

    /// Timeout for one ffprobe call, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_trailing_padding() -> f64 {
    1.0
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_fps() -> u32 {
    30
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_media_timeout() -> u64 {
    1800
}

fn default_probe_timeout() -> u64 {
    30
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            trailing_padding_secs: default_trailing_padding(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            sample_rate: default_sample_rate(),
            short_video_policy: ShortVideoPolicy::default(),
            timeout_secs: default_media_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl MediaSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Per-session pipeline behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Scenes fetched concurrently within one session.
    #[serde(default = "default_scene_concurrency")]
    pub scene_concurrency: usize,
}

fn default_scene_concurrency() -> usize {
    4
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            scene_concurrency: default_scene_concurrency(),
        }
    }
}

/// HTTP front end and session worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Sessions executed at the same time.
    #[serde(default = "default_max_sessions")]
    pub max_concurrent_sessions: usize,

    /// Sessions waiting for a worker before requests are rejected.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_listen() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_max_sessions() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    32
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            max_concurrent_sessions: default_max_sessions(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_serializes() {
        let settings = Settings::default();
        let toml = toml::to_string_pretty(&settings).unwrap();
        assert!(toml.contains("[paths]"));
        assert!(toml.contains("[media]"));
        assert!(toml.contains("short_video_policy = \"freeze_last_frame\""));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let minimal = "[footage]\nfallback_keyword = \"ocean\"";
        let parsed: Settings = toml::from_str(minimal).unwrap();
        assert_eq!(parsed.footage.fallback_keyword, "ocean");
        assert_eq!(parsed.footage.per_page, 1);
        assert_eq!(parsed.script.scene_count, 4);
        assert!((parsed.media.trailing_padding_secs - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn short_video_policy_parses_snake_case() {
        let parsed: Settings = toml::from_str("[media]\nshort_video_policy = \"loop\"").unwrap();
        assert_eq!(parsed.media.short_video_policy, ShortVideoPolicy::Loop);
    }

    #[test]
    fn timeouts_convert_to_durations() {
        let settings = Settings::default();
        assert_eq!(settings.script.timeout(), Duration::from_secs(60));
        assert_eq!(settings.media.probe_timeout(), Duration::from_secs(30));
    }
}

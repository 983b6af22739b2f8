//! Config manager for loading and saving settings.
//!
//! Key features:
//! - Atomic writes (write to temp file, then rename)
//! - Missing keys are filled with defaults and written back
//! - Unknown top-level tables are dropped on load

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use toml_edit::DocumentMut;

use super::settings::Settings;

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid config value for {key}: {message}")]
    Invalid { key: String, message: String },
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages the reelforge settings file.
pub struct ConfigManager {
    /// Path to the config file.
    config_path: PathBuf,
    /// Current settings loaded in memory.
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get a reference to the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to the current settings.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Consume the manager and return the loaded settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        let settings: Settings = toml::from_str(&content)?;
        validate(&settings)?;
        self.settings = settings;
        Ok(())
    }

    /// Load config from file, creating with defaults if it doesn't exist.
    ///
    /// Also cleans up the file, saving if defaults were filled in or
    /// unknown sections were dropped.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = parse_and_clean(&content)?;
            validate(&settings)?;
            self.settings = settings;

            if was_modified {
                tracing::info!(
                    "Rewriting {} with defaults for missing keys",
                    self.config_path.display()
                );
                self.save()?;
            }
        } else {
            self.settings = Settings::default();
            self.save()?;
        }
        Ok(())
    }

    /// Ensure the temp and logs directories exist.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        let dirs = [
            &self.settings.paths.temp_root,
            &self.settings.paths.logs_folder,
        ];

        for dir in dirs {
            fs::create_dir_all(dir)?;
        }

        Ok(())
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Generate config content with a comment above each section.
    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let s = &self.settings;
        let mut output = String::new();

        output.push_str("# reelforge configuration\n");
        output.push_str("# API keys are read from GEMINI_API_KEY and PEXELS_API_KEY.\n\n");

        push_section(&mut output, "Temp artifacts and session logs", "paths", &s.paths)?;
        push_section(&mut output, "Logging", "logging", &s.logging)?;
        push_section(&mut output, "Scene script generation", "script", &s.script)?;
        push_section(&mut output, "Stock footage search", "footage", &s.footage)?;
        push_section(&mut output, "Voiceover synthesis", "speech", &s.speech)?;
        push_section(&mut output, "Upload of the final video", "publish", &s.publish)?;
        push_section(&mut output, "ffmpeg rendering", "media", &s.media)?;
        push_section(&mut output, "Per-session behavior", "pipeline", &s.pipeline)?;
        push_section(&mut output, "HTTP server and workers", "server", &s.server)?;

        Ok(output)
    }

    /// Write content to config file atomically.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

/// Parse config content, reporting whether it needs to be rewritten.
fn parse_and_clean(content: &str) -> ConfigResult<(Settings, bool)> {
    let doc: DocumentMut = content.parse()?;
    let settings: Settings = toml::from_str(content)?;

    let has_unknown = doc
        .iter()
        .any(|(key, _)| !Settings::SECTIONS.contains(&key));

    // Missing keys: every section must already carry every default key.
    let mut missing_keys = false;
    let full: DocumentMut = toml::to_string(&settings)?.parse()?;
    for (section, item) in full.iter() {
        let Some(table) = item.as_table() else {
            continue;
        };
        match doc.get(section).and_then(|i| i.as_table()) {
            Some(existing) => {
                if table.iter().any(|(key, _)| !existing.contains_key(key)) {
                    missing_keys = true;
                }
            }
            None => missing_keys = true,
        }
    }

    Ok((settings, has_unknown || missing_keys))
}

/// Reject values the pipeline cannot run with.
fn validate(settings: &Settings) -> ConfigResult<()> {
    if settings.script.scene_count == 0 {
        return Err(invalid("script.scene_count", "must be at least 1"));
    }
    if settings.script.min_words > settings.script.max_words {
        return Err(invalid("script.min_words", "must not exceed script.max_words"));
    }
    if settings.footage.fallback_keyword.trim().is_empty() {
        return Err(invalid("footage.fallback_keyword", "must not be empty"));
    }
    if !settings.publish.upload_url_template.contains("{server}") {
        return Err(invalid(
            "publish.upload_url_template",
            "must contain a {server} placeholder",
        ));
    }
    let padding = settings.media.trailing_padding_secs;
    if padding.is_nan() || padding < 0.0 {
        return Err(invalid("media.trailing_padding_secs", "must be >= 0"));
    }
    if settings.media.width == 0 || settings.media.height == 0 || settings.media.fps == 0 {
        return Err(invalid("media", "width, height and fps must be positive"));
    }
    if settings.pipeline.scene_concurrency == 0 {
        return Err(invalid("pipeline.scene_concurrency", "must be at least 1"));
    }
    let timeouts = [
        ("script.timeout_secs", settings.script.timeout_secs),
        ("footage.timeout_secs", settings.footage.timeout_secs),
        ("speech.timeout_secs", settings.speech.timeout_secs),
        ("publish.timeout_secs", settings.publish.timeout_secs),
        ("media.timeout_secs", settings.media.timeout_secs),
        ("media.probe_timeout_secs", settings.media.probe_timeout_secs),
    ];
    if let Some((key, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
        return Err(invalid(key, "must be at least 1"));
    }
    if settings.server.max_concurrent_sessions == 0 || settings.server.queue_capacity == 0 {
        return Err(invalid(
            "server",
            "max_concurrent_sessions and queue_capacity must be at least 1",
        ));
    }
    Ok(())
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn push_section<T: Serialize>(
    output: &mut String,
    comment: &str,
    table: &str,
    value: &T,
) -> ConfigResult<()> {
    output.push_str(&format!("# {}\n[{}]\n", comment, table));
    output.push_str(&toml::to_string_pretty(value)?);
    output.push('\n');
    Ok(())
}

//! Configuration management for reelforge.
//!
//! This module provides:
//! - TOML-based settings with one table per pipeline stage
//! - Atomic file writes (write to temp, then rename)
//! - Cleanup of unknown sections on load
//! - Provider credentials read from the environment
//!
//! # Example
//!
//! ```no_run
//! use reel_core::config::{ConfigManager, Credentials};
//!
//! let mut config = ConfigManager::new("reelforge.toml");
//! config.load_or_create().unwrap();
//!
//! println!("Temp root: {}", config.settings().paths.temp_root);
//! let credentials = Credentials::from_env();
//! ```

mod credentials;
mod manager;
mod settings;

pub use credentials::{Credentials, GEMINI_API_KEY_VAR, PEXELS_API_KEY_VAR};
pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    FootageSettings, LoggingSettings, MediaSettings, PathSettings, PipelineSettings,
    PublishSettings, ScriptSettings, ServerSettings, Settings, ShortVideoPolicy,
    SpeechSettings,
};

//! Logging infrastructure for reelforge.
//!
//! This module provides:
//! - Per-session loggers with file output mirrored into `tracing`
//! - Compact mode that keeps tool output out of the log unless it fails
//! - Tail buffer for error diagnosis
//! - Global subscriber setup for the server binary
//!
//! # Example
//!
//! ```no_run
//! use reel_core::logging::{LogConfig, SessionLogger};
//!
//! let logger = SessionLogger::new("3f2a9c", "/path/to/logs", LogConfig::default()).unwrap();
//!
//! logger.phase("Script");
//! logger.command("ffmpeg -i input.mp4 ...");
//! logger.success("Session completed");
//! ```

mod session_logger;
mod types;

pub use session_logger::SessionLogger;
pub use types::{LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr with timestamps
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_to_filter_works() {
        assert_eq!(LogLevel::Debug.as_filter_str(), "debug");
        assert_eq!(LogLevel::Info.as_filter_str(), "info");
    }
}

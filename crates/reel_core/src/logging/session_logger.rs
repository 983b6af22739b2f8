//! Per-session logger with file and tracing output.
//!
//! Each session gets its own logger that:
//! - Writes to a dedicated log file named after the session id
//! - Mirrors every line into `tracing` with a `session` field
//! - Maintains a tail buffer of tool output for error diagnosis

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogConfig, LogLevel, MessagePrefix};

/// Per-session logger.
pub struct SessionLogger {
    /// Session id used in the filename and tracing field.
    session_id: String,
    /// Path to log file (None when running detached).
    log_path: Option<PathBuf>,
    /// File writer (buffered).
    file_writer: Mutex<Option<BufWriter<File>>>,
    /// Logging configuration.
    config: LogConfig,
    /// Tail buffer for recent tool output.
    tail_buffer: Mutex<VecDeque<String>>,
}

impl SessionLogger {
    /// Create a logger writing to `{log_dir}/{session_id}.log`.
    pub fn new(
        session_id: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
    ) -> std::io::Result<Self> {
        let session_id = session_id.into();
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&session_id)));
        let file = File::create(&log_path)?;

        Ok(Self {
            session_id,
            log_path: Some(log_path),
            file_writer: Mutex::new(Some(BufWriter::new(file))),
            tail_buffer: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            config,
        })
    }

    /// Create a logger that only emits to `tracing` (no file).
    pub fn detached(session_id: impl Into<String>, config: LogConfig) -> Self {
        Self {
            session_id: session_id.into(),
            log_path: None,
            file_writer: Mutex::new(None),
            tail_buffer: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            config,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Get the log file path, if the session writes one.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        let session = self.session_id.as_str();
        match level {
            LogLevel::Trace => tracing::trace!(session, "{}", message),
            LogLevel::Debug => tracing::debug!(session, "{}", message),
            LogLevel::Info => tracing::info!(session, "{}", message),
            LogLevel::Warn => tracing::warn!(session, "{}", message),
            LogLevel::Error => tracing::error!(session, "{}", message),
        }

        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a command being executed.
    pub fn command(&self, command: &str) {
        let msg = MessagePrefix::Command.format(command);
        self.log(LogLevel::Debug, &msg);
    }

    /// Log a phase marker.
    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    /// Log a section marker.
    pub fn section(&self, section_name: &str) {
        let msg = MessagePrefix::Section.format(section_name);
        self.log(LogLevel::Info, &msg);
    }

    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Log command output line (stdout/stderr from external tools).
    ///
    /// In compact mode, these are only added to the tail buffer.
    pub fn output_line(&self, line: &str, is_stderr: bool) {
        {
            let mut buffer = self.tail_buffer.lock();
            if buffer.len() >= self.config.error_tail {
                buffer.pop_front();
            }
            buffer.push_back(line.to_string());
        }

        if self.config.compact {
            return;
        }

        let prefix = if is_stderr { "[stderr] " } else { "" };
        self.output(&self.format_message(&format!("{}{}", prefix, line)));
    }

    /// Show the tail buffer (typically after an error).
    pub fn show_tail(&self, header: &str) {
        let lines: Vec<String> = self.tail_buffer.lock().iter().cloned().collect();
        if lines.is_empty() {
            return;
        }

        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in &lines {
            tracing::warn!(session = self.session_id.as_str(), "{}", line);
            self.output(&self.format_message(line));
        }
    }

    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release the file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    /// Write a formatted message to the session file.
    fn output(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }
    }
}

impl Drop for SessionLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sanitize a string to be safe for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_log_file_named_after_session() {
        let dir = tempdir().unwrap();
        let logger = SessionLogger::new("abc123", dir.path(), LogConfig::default()).unwrap();

        let path = logger.log_path().unwrap();
        assert!(path.exists());
        assert!(path.to_string_lossy().ends_with("abc123.log"));
    }

    #[test]
    fn writes_to_file() {
        let dir = tempdir().unwrap();
        let logger = SessionLogger::new("abc123", dir.path(), LogConfig::default()).unwrap();

        logger.info("Scene 2 dropped");
        logger.flush();

        let content = fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(content.contains("Scene 2 dropped"));
    }

    #[test]
    fn level_filter_applies() {
        let dir = tempdir().unwrap();
        let logger = SessionLogger::new("abc123", dir.path(), LogConfig::default()).unwrap();

        logger.debug("hidden detail");
        logger.info("visible");
        logger.flush();

        let content = fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(!content.contains("hidden detail"));
        assert!(content.contains("visible"));
    }

    #[test]
    fn detached_logger_has_no_file() {
        let logger = SessionLogger::detached("abc123", LogConfig::default());
        logger.info("only to tracing");
        assert!(logger.log_path().is_none());
    }

    #[test]
    fn tail_buffer_maintains_limit() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            error_tail: 5,
            compact: true,
            ..LogConfig::default()
        };
        let logger = SessionLogger::new("abc123", dir.path(), config).unwrap();

        for i in 0..10 {
            logger.output_line(&format!("Line {}", i), true);
        }
        logger.show_tail("ffmpeg");
        logger.flush();

        let content = fs::read_to_string(logger.log_path().unwrap()).unwrap();
        assert!(content.contains("[ffmpeg/tail]"));
        assert!(!content.contains("Line 4"));
        for i in 5..10 {
            assert!(content.contains(&format!("Line {}", i)));
        }
    }

    #[test]
    fn sanitizes_filename() {
        assert_eq!(sanitize_filename("normal_name"), "normal_name");
        assert_eq!(sanitize_filename("has/slash"), "has_slash");
        assert_eq!(sanitize_filename("a<b>c"), "a_b_c");
    }
}

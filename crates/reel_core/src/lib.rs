//! reelforge core - backend logic for topic-to-video sessions
//!
//! This crate contains the whole video-assembly pipeline with zero HTTP
//! dependencies. The server binary only parses requests and hands topics
//! to the [`orchestrator::SessionQueue`].

pub mod assets;
pub mod config;
pub mod logging;
pub mod media;
pub mod models;
pub mod orchestrator;
pub mod publish;
pub mod script;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}

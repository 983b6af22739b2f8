//! Script generation: topic -> ordered scene descriptors.
//!
//! The text model is reached through the [`TextGenerator`] trait so the
//! prompt building and response parsing can be exercised without a network.
//! [`GeminiClient`] is the production implementation.

mod error;
mod gemini;
mod generator;
mod parse;

pub use error::{GenerationError, GenerationResult};
pub use gemini::GeminiClient;
pub use generator::{ScriptGenerator, TextGenerator};
pub use parse::{parse_script, strip_wrappers};

//! Session orchestration.
//!
//! A session moves through the states in
//! [`SessionState`](crate::models::SessionState); the orchestrator records
//! each move, absorbs per-scene failures, and always ends by deleting every
//! registered temp file.

mod errors;
mod pipeline;
mod queue;
mod report;
mod session;
mod temp_files;

pub use errors::{PipelineError, SubmitError};
pub use pipeline::{Providers, SessionOrchestrator, SessionRunner};
pub use queue::{SessionJob, SessionQueue};
pub use report::{DroppedScene, SessionReport};
pub use session::Session;
pub use temp_files::TempFiles;

//! Core data types shared across the pipeline stages.

mod scene;
mod session;

pub use scene::{DropReason, SceneAssets, SceneDescriptor};
pub use session::{SessionId, SessionOutcome, SessionState};

//! Publishing the finished video to a file host.

mod error;
mod gofile;

pub use error::{PublishError, PublishResult};
pub use gofile::{GofileClient, Publisher};

//! Clip synchronization and sequence assembly on top of ffmpeg.

mod assemble;
mod compositor;
mod error;
mod ffmpeg;
mod sync;

pub use assemble::{build_ffmpeg_args, build_filter_graph, RenderOptions};
pub use compositor::{Compositor, FfmpegCompositor};
pub use error::{MediaError, MediaResult};
pub use ffmpeg::FfmpegTools;
pub use sync::{plan_clip, ClipFill, ClipSource, SynchronizedClip};

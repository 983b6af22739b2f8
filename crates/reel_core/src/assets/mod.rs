//! Scene asset fetching: stock footage plus synthesized voiceover.
//!
//! Providers sit behind [`StockFootage`] and [`SpeechSynthesizer`]; the
//! production clients are [`PexelsClient`] and [`GoogleTts`]. Failures stay
//! local to the scene and surface as a [`DropReason`](crate::models::DropReason).

mod download;
mod error;
mod fetcher;
mod footage;
mod speech;

pub use error::{AssetFetchError, AssetFetchResult};
pub use fetcher::SceneAssetFetcher;
pub use footage::{PexelsClient, StockFootage};
pub use speech::{chunk_text, GoogleTts, SpeechSynthesizer, MAX_CHUNK_CHARS};

//! Streaming HTTP bodies to disk.

use std::path::Path;

use futures_util::StreamExt;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use super::error::{AssetFetchError, AssetFetchResult};

/// Write a response body to `dest` chunk by chunk.
///
/// With `append` the body is added to the end of an existing file,
/// otherwise the file is truncated first. Returns the number of bytes
/// written by this call.
pub(crate) async fn stream_to_file(
    response: reqwest::Response,
    dest: &Path,
    append: bool,
) -> AssetFetchResult<u64> {
    let status = response.status();
    if !status.is_success() {
        let url = response.url().path().to_string();
        return Err(AssetFetchError::status(status, url));
    }

    let mut options = OpenOptions::new();
    options.create(true);
    if append {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    let mut file = options.open(dest).await?;

    let mut written = 0u64;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

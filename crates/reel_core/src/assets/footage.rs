//! Stock footage search and download (Pexels).

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use super::download::stream_to_file;
use super::error::{AssetFetchError, AssetFetchResult};
use crate::config::FootageSettings;

/// A searchable library of stock video clips.
#[async_trait]
pub trait StockFootage: Send + Sync {
    /// Link to the first file of the first result, `None` when nothing matches.
    async fn search(&self, keyword: &str) -> AssetFetchResult<Option<String>>;

    /// Download a clip to `dest`, returning its size in bytes.
    async fn download(&self, url: &str, dest: &Path) -> AssetFetchResult<u64>;
}

/// Pexels video API client.
pub struct PexelsClient {
    client: reqwest::Client,
    endpoint: String,
    per_page: u32,
    api_key: Option<String>,
}

impl PexelsClient {
    pub fn new(settings: &FootageSettings, api_key: Option<String>) -> AssetFetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            per_page: settings.per_page.max(1),
            api_key,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/videos/search", self.endpoint)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    videos: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    #[serde(default)]
    video_files: Vec<VideoFile>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    link: String,
}

/// First result's first file link.
fn first_link(body: &str, keyword: &str) -> AssetFetchResult<Option<String>> {
    let parsed: SearchResponse = serde_json::from_str(body)
        .map_err(|e| AssetFetchError::InvalidResponse(e.to_string()))?;

    let Some(video) = parsed.videos.into_iter().next() else {
        return Ok(None);
    };
    video
        .video_files
        .into_iter()
        .next()
        .map(|f| Some(f.link))
        .ok_or_else(|| AssetFetchError::NoVariants {
            keyword: keyword.to_string(),
        })
}

#[async_trait]
impl StockFootage for PexelsClient {
    async fn search(&self, keyword: &str) -> AssetFetchResult<Option<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AssetFetchError::MissingApiKey { provider: "Pexels" })?;

        let per_page = self.per_page.to_string();
        let response = self
            .client
            .get(self.search_url())
            .header(AUTHORIZATION, api_key)
            .query(&[("query", keyword), ("page", "1"), ("per_page", per_page.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetFetchError::status(status, self.search_url()));
        }

        let body = response.text().await?;
        first_link(&body, keyword)
    }

    async fn download(&self, url: &str, dest: &Path) -> AssetFetchResult<u64> {
        let response = self.client.get(url).send().await?;
        stream_to_file(response, dest, false).await
    }
}

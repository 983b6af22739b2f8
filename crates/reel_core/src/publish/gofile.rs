//! Gofile hosting client.
//!
//! Uploading takes two calls: ask the API which storage server to use,
//! then post the file to that server.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::error::{PublishError, PublishResult};
use crate::config::PublishSettings;

const SERVER_STAGE: &str = "Server allocation";
const UPLOAD_STAGE: &str = "Upload";

/// Puts a finished file somewhere shareable.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Upload `file` and return its public download URL.
    async fn publish(&self, file: &Path) -> PublishResult<String>;
}

/// Common Gofile response shape.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    data: Option<EnvelopeData>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvelopeData {
    server: Option<String>,
    #[serde(rename = "downloadPage")]
    download_page: Option<String>,
    error: Option<serde_json::Value>,
}

impl Envelope {
    fn parse(stage: &'static str, body: &str) -> PublishResult<EnvelopeData> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| PublishError::invalid_response(stage, e.to_string()))?;
        let data = envelope.data.unwrap_or_default();

        if envelope.status != "ok" {
            let detail = data.error.map(|e| match e {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
            return Err(PublishError::Rejected {
                stage,
                status: envelope.status,
                detail,
            });
        }
        Ok(data)
    }
}

fn parse_server(body: &str) -> PublishResult<String> {
    let server = Envelope::parse(SERVER_STAGE, body)?
        .server
        .ok_or_else(|| PublishError::invalid_response(SERVER_STAGE, "missing data.server"))?;

    // The name becomes part of a hostname
    if server.is_empty() || !server.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(PublishError::invalid_response(
            SERVER_STAGE,
            format!("bad server name '{}'", server),
        ));
    }
    Ok(server)
}

fn parse_download_page(body: &str) -> PublishResult<String> {
    Envelope::parse(UPLOAD_STAGE, body)?
        .download_page
        .ok_or_else(|| PublishError::invalid_response(UPLOAD_STAGE, "missing data.downloadPage"))
}

/// Gofile API client.
pub struct GofileClient {
    client: reqwest::Client,
    endpoint: String,
    upload_url_template: String,
    timeout: Duration,
}

impl GofileClient {
    pub fn new(settings: &PublishSettings) -> PublishResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            upload_url_template: settings.upload_url_template.clone(),
            timeout: settings.timeout(),
        })
    }

    pub fn upload_url(&self, server: &str) -> String {
        self.upload_url_template.replace("{server}", server)
    }

    async fn allocate_server(&self) -> PublishResult<String> {
        let response = self
            .client
            .get(format!("{}/getServer", self.endpoint))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        // Gofile reports failures in the body, so only bail on bodies we cannot read
        if !status.is_success() && serde_json::from_str::<Envelope>(&body).is_err() {
            return Err(PublishError::Status {
                stage: SERVER_STAGE,
                status: status.as_u16(),
            });
        }
        parse_server(&body)
    }

    async fn upload(&self, server: &str, file: &Path) -> PublishResult<String> {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());

        let handle = tokio::fs::File::open(file).await?;
        let length = handle.metadata().await?.len();
        let part = Part::stream_with_length(reqwest::Body::from(handle), length)
            .file_name(file_name)
            .mime_str("video/mp4")?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.upload_url(server))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() && serde_json::from_str::<Envelope>(&body).is_err() {
            return Err(PublishError::Status {
                stage: UPLOAD_STAGE,
                status: status.as_u16(),
            });
        }
        parse_download_page(&body)
    }
}

#[async_trait]
impl Publisher for GofileClient {
    async fn publish(&self, file: &Path) -> PublishResult<String> {
        let work = async {
            let server = self.allocate_server().await?;
            tracing::debug!("Uploading {} via server {}", file.display(), server);
            self.upload(&server, file).await
        };
        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| PublishError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_allocation() {
        let body = r#"{"status":"ok","data":{"server":"store4"}}"#;
        assert_eq!(parse_server(body).unwrap(), "store4");
    }

    #[test]
    fn non_ok_allocation_is_rejected() {
        let body = r#"{"status":"error-rateLimit","data":{}}"#;
        let err = parse_server(body).unwrap_err();
        assert!(matches!(
            err,
            PublishError::Rejected { stage: SERVER_STAGE, ref status, detail: None }
                if status == "error-rateLimit"
        ));
    }

    #[test]
    fn suspicious_server_name_is_rejected() {
        let body = r#"{"status":"ok","data":{"server":"evil.example/x"}}"#;
        assert!(matches!(
            parse_server(body),
            Err(PublishError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn parses_download_page() {
        let body = r#"{"status":"ok","data":{"downloadPage":"https://gofile.io/d/Ab12","code":"Ab12"}}"#;
        assert_eq!(parse_download_page(body).unwrap(), "https://gofile.io/d/Ab12");
    }

    #[test]
    fn upload_error_carries_detail() {
        let body = r#"{"status":"error","data":{"error":"file too large"}}"#;
        let err = parse_download_page(body).unwrap_err();
        assert!(err.to_string().contains("file too large"));
        assert!(err.to_string().starts_with("Upload was rejected"));
    }

    #[test]
    fn garbage_body_is_invalid_response() {
        assert!(matches!(
            parse_download_page("<html>"),
            Err(PublishError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn upload_url_fills_server() {
        let client = GofileClient::new(&PublishSettings::default()).unwrap();
        assert_eq!(
            client.upload_url("store4"),
            "https://store4.gofile.io/uploadFile"
        );
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let client = GofileClient::new(&PublishSettings::default()).unwrap();
        let err = client
            .upload("store4", Path::new("/no/such/final_x.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Io(_)));
    }
}

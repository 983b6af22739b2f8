//! Gemini text model client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::error::{GenerationError, GenerationResult};
use super::generator::TextGenerator;
use crate::config::ScriptSettings;

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-goog-api-key");

/// Client for the `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a client from the script settings.
    ///
    /// A missing key is accepted here and reported on the first call, so the
    /// server can still start and answer its health route.
    pub fn new(settings: &ScriptSettings, api_key: Option<String>) -> GenerationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            api_key,
        })
    }

    fn build_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

/// Pull the first candidate's text out of a response body.
fn extract_text(body: &str) -> GenerationResult<String> {
    let parsed: GeminiResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::parse(e.to_string()))?;

    if let Some(error) = parsed.error {
        return Err(GenerationError::Api(error.message));
    }

    let text: String = parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn complete(&self, prompt: &str) -> GenerationResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key_value = HeaderValue::from_str(api_key)
            .map_err(|_| GenerationError::transport("API key is not a valid header value"))?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(self.build_url())
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        extract_text(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_names_model_without_key() {
        let client =
            GeminiClient::new(&ScriptSettings::default(), Some("test-key".into())).unwrap();
        let url = client.build_url();
        assert!(url.ends_with("gemini-1.5-flash:generateContent"));
        assert!(!url.contains("test-key"));
    }

    #[tokio::test]
    async fn transport_error_does_not_leak_key() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let settings = ScriptSettings {
            endpoint: format!("http://127.0.0.1:{port}"),
            timeout_secs: 5,
            ..ScriptSettings::default()
        };
        let client = GeminiClient::new(&settings, Some("super-secret-key".into())).unwrap();

        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
        let rendered = err.to_string();
        assert!(!rendered.contains("super-secret-key"), "{rendered}");
        assert!(!format!("{err:?}").contains("super-secret-key"));
    }

    #[test]
    fn reqwest_conversion_strips_url() {
        let err = reqwest::Client::new()
            .get("not a url?key=super-secret-key")
            .build()
            .unwrap_err();
        let converted = GenerationError::from(err);
        assert!(!converted.to_string().contains("super-secret-key"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_network() {
        let client = GeminiClient::new(&ScriptSettings::default(), None).unwrap();
        let err = client.complete("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }

    #[test]
    fn extracts_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"scenes\":"},{"text":"[]}"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "{\"scenes\":[]}");
    }

    #[test]
    fn api_error_is_reported() {
        let body = r#"{"error":{"message":"quota exceeded","code":429}}"#;
        let err = extract_text(body).unwrap_err();
        assert!(matches!(err, GenerationError::Api(ref m) if m == "quota exceeded"));
    }

    #[test]
    fn empty_candidates_is_empty_response() {
        assert!(matches!(
            extract_text(r#"{"candidates":[]}"#),
            Err(GenerationError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text("not json"),
            Err(GenerationError::Parse(_))
        ));
    }
}

//! Voiceover synthesis through the Google Translate TTS endpoint.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{REFERER, USER_AGENT};

use super::download::stream_to_file;
use super::error::{AssetFetchError, AssetFetchResult};
use crate::config::SpeechSettings;

/// Longest text the TTS endpoint accepts in one request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Turns narration text into an audio file.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into an MP3 at `dest`, returning its size in bytes.
    async fn synthesize(&self, text: &str, dest: &Path) -> AssetFetchResult<u64>;
}

/// Split text into pieces of at most `max_chars` characters.
///
/// Splits on whitespace; a single word longer than the limit is cut.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Google Translate text-to-speech client.
pub struct GoogleTts {
    client: reqwest::Client,
    endpoint: String,
    language: String,
    slow: bool,
}

impl GoogleTts {
    pub fn new(settings: &SpeechSettings) -> AssetFetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            language: settings.language.clone(),
            slow: settings.slow,
        })
    }

    fn query(&self, chunk: &str, idx: usize, total: usize) -> Vec<(&'static str, String)> {
        vec![
            ("ie", "UTF-8".to_string()),
            ("q", chunk.to_string()),
            ("tl", self.language.clone()),
            ("client", "tw-ob".to_string()),
            ("total", total.to_string()),
            ("idx", idx.to_string()),
            ("textlen", chunk.chars().count().to_string()),
            ("ttsspeed", if self.slow { "0.24" } else { "1" }.to_string()),
        ]
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, dest: &Path) -> AssetFetchResult<u64> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(AssetFetchError::Synthesis("no text to speak".to_string()));
        }

        let total = chunks.len();
        let mut written = 0u64;
        for (idx, chunk) in chunks.iter().enumerate() {
            let response = self
                .client
                .get(&self.endpoint)
                .header(USER_AGENT, "Mozilla/5.0")
                .header(REFERER, "https://translate.google.com/")
                .query(&self.query(chunk, idx, total))
                .send()
                .await?;
            written += stream_to_file(response, dest, idx > 0).await?;
        }

        if written == 0 {
            return Err(AssetFetchError::Synthesis("empty audio response".to_string()));
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(
            chunk_text("Đại dương bao la", MAX_CHUNK_CHARS),
            vec!["Đại dương bao la".to_string()]
        );
    }

    #[test]
    fn chunks_respect_limit_and_word_boundaries() {
        let text = "Rạn san hô là ngôi nhà của hàng nghìn loài sinh vật biển, \
                    từ những con cá nhỏ đầy màu sắc cho đến rùa biển và cá mập rạn san hô.";
        let chunks = chunk_text(text, 40);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 40, "chunk too long: {chunk}");
            assert!(!chunk.starts_with(' ') && !chunk.ends_with(' '));
        }
        let rejoined = chunks.join(" ");
        let normalized: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, normalized.join(" "));
    }

    #[test]
    fn long_word_is_cut() {
        let word = "a".repeat(250);
        let chunks = chunk_text(&word, MAX_CHUNK_CHARS);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 50);
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(chunk_text("   \n ", MAX_CHUNK_CHARS).is_empty());
    }

    #[test]
    fn query_carries_language_and_position() {
        let tts = GoogleTts::new(&SpeechSettings::default()).unwrap();
        let query = tts.query("xin chào", 1, 3);
        assert!(query.contains(&("tl", "vi".to_string())));
        assert!(query.contains(&("idx", "1".to_string())));
        assert!(query.contains(&("total", "3".to_string())));
        assert!(query.contains(&("textlen", "8".to_string())));
    }

    #[tokio::test]
    async fn blank_text_fails_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let tts = GoogleTts::new(&SpeechSettings::default()).unwrap();
        let err = tts
            .synthesize("  ", &dir.path().join("a.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssetFetchError::Synthesis(_)));
    }
}

//! Script generator: builds the prompt and validates the answer.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::{GenerationError, GenerationResult};
use super::parse::parse_script;
use crate::config::ScriptSettings;
use crate::models::SceneDescriptor;

/// A text model that answers one prompt with free-form text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> GenerationResult<String>;
}

/// Turns a topic into an ordered list of scenes.
///
/// Makes exactly one model call per topic and never retries.
pub struct ScriptGenerator {
    text: Arc<dyn TextGenerator>,
    settings: ScriptSettings,
}

impl ScriptGenerator {
    pub fn new(text: Arc<dyn TextGenerator>, settings: ScriptSettings) -> Self {
        Self { text, settings }
    }

    /// Build the structured-generation prompt for a topic.
    pub fn build_prompt(&self, topic: &str) -> String {
        let s = &self.settings;
        format!(
            "Write the script for a short video of about one minute about '{topic}', \
             split into {count} scenes.\n\
             For each scene provide \"voiceover\" (narration in {language}, {min}-{max} words) \
             and \"search_keyword\" (2-3 English words used to search stock footage).\n\
             Answer with valid JSON only, in this shape:\n\
             {{\n  \"scenes\": [\n    {{\"voiceover\": \"...\", \"search_keyword\": \"...\"}},\n    \
             {{\"voiceover\": \"...\", \"search_keyword\": \"...\"}}\n  ]\n}}",
            topic = topic.trim(),
            count = s.scene_count,
            language = s.narration_language,
            min = s.min_words,
            max = s.max_words,
        )
    }

    /// Generate the scene list for a topic.
    pub async fn generate(&self, topic: &str) -> GenerationResult<Vec<SceneDescriptor>> {
        let prompt = self.build_prompt(topic);
        let timeout = self.settings.timeout();

        tracing::debug!("Requesting script for '{}'", topic);

        let text = tokio::time::timeout(timeout, self.text.complete(&prompt))
            .await
            .map_err(|_| GenerationError::Timeout(timeout))??;

        let scenes = parse_script(&text)?;
        tracing::debug!("Script for '{}' has {} scenes", topic, scenes.len());
        Ok(scenes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct CannedText {
        reply: GenerationResult<String>,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedText {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedText {
        async fn complete(&self, prompt: &str) -> GenerationResult<String> {
            self.prompts.lock().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(GenerationError::transport(e.to_string())),
            }
        }
    }

    struct SlowText;

    #[async_trait]
    impl TextGenerator for SlowText {
        async fn complete(&self, _prompt: &str) -> GenerationResult<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(String::new())
        }
    }

    #[test]
    fn prompt_carries_scene_bounds() {
        let generator =
            ScriptGenerator::new(Arc::new(CannedText::ok("")), ScriptSettings::default());
        let prompt = generator.build_prompt("ocean life");
        assert!(prompt.contains("'ocean life'"));
        assert!(prompt.contains("4 scenes"));
        assert!(prompt.contains("20-30 words"));
        assert!(prompt.contains("\"search_keyword\""));
    }

    #[tokio::test]
    async fn generate_parses_fenced_reply() {
        let text = Arc::new(CannedText::ok(
            "```json\n{\"scenes\":[{\"voiceover\":\"Cá heo rất thông minh.\",\"search_keyword\":\"dolphins\"}]}\n```",
        ));
        let generator = ScriptGenerator::new(text.clone(), ScriptSettings::default());

        let scenes = generator.generate("dolphins").await.unwrap();

        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].search_keyword, "dolphins");
        assert_eq!(text.prompts.lock().len(), 1);
    }

    #[tokio::test]
    async fn model_failure_is_generation_error() {
        let text = Arc::new(CannedText {
            reply: Err(GenerationError::transport("connection refused")),
            prompts: Mutex::new(Vec::new()),
        });
        let generator = ScriptGenerator::new(text, ScriptSettings::default());

        let err = generator.generate("topic").await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }

    #[tokio::test]
    async fn slow_model_times_out() {
        let settings = ScriptSettings {
            timeout_secs: 1,
            ..ScriptSettings::default()
        };
        let generator = ScriptGenerator::new(Arc::new(SlowText), settings);

        let err = generator.generate("topic").await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout(_)));
    }
}

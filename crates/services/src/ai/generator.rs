use async_trait::async_trait;
use quiz_core::model::{Difficulty, Question};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::config::GeneratorConfig;
use crate::ai::parse::parse_questions;
use crate::ai::prompt::question_prompt;
use crate::error::{GeneratorConfigError, ProviderError};
use crate::provider::QuestionProvider;

/// Asks an OpenAI-compatible chat-completions endpoint to write questions.
#[derive(Clone)]
pub struct AiQuestionProvider {
    client: Client,
    config: Option<GeneratorConfig>,
}

impl AiQuestionProvider {
    /// # Errors
    ///
    /// Returns `GeneratorConfigError` if the environment holds invalid settings.
    pub fn from_env() -> Result<Self, GeneratorConfigError> {
        Ok(Self::new(GeneratorConfig::from_env()?))
    }

    #[must_use]
    pub fn new(config: Option<GeneratorConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Send the prompt and return the raw reply text.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when generation is disabled, the request fails,
    /// or the reply is empty.
    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let config = self.config.as_ref().ok_or(ProviderError::Disabled)?;

        let payload = ChatRequest {
            model: config.model().to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.7,
        };

        let response = self
            .client
            .post(config.completions_url())
            .bearer_auth(config.api_key())
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ProviderError::EmptyResponse)?;

        Ok(content)
    }
}

#[async_trait]
impl QuestionProvider for AiQuestionProvider {
    async fn fetch(&self, difficulty: Difficulty) -> Result<Vec<Question>, ProviderError> {
        let count = self
            .config
            .as_ref()
            .ok_or(ProviderError::Disabled)?
            .question_count();
        let prompt = question_prompt(difficulty, count);
        debug!(%difficulty, count, "requesting generated questions");

        let reply = self.generate(&prompt).await?;
        let questions = parse_questions(&reply)?;
        info!(%difficulty, received = questions.len(), "generated questions parsed");
        Ok(questions)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_provider_fails_without_network() {
        let provider = AiQuestionProvider::new(None);
        assert!(!provider.enabled());
        let err = provider.fetch(Difficulty::Easy).await.unwrap_err();
        assert!(matches!(err, ProviderError::Disabled));
    }

    #[test]
    fn chat_response_tolerates_missing_content() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(body.choices[0].message.content.is_none());
    }
}

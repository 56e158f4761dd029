use std::env;

use url::Url;

use crate::error::GeneratorConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Connection settings for the chat-completions endpoint that writes questions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    base_url: String,
    api_key: String,
    model: String,
    question_count: u32,
}

impl GeneratorConfig {
    /// Build a config with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            question_count: DEFAULT_QUESTION_COUNT,
        }
    }

    /// Read `QUIZ_AI_API_KEY`, `QUIZ_AI_BASE_URL`, `QUIZ_AI_MODEL` and
    /// `QUIZ_QUESTION_COUNT`.
    ///
    /// Returns `Ok(None)` when no key is set, which disables generation.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Option<Self>, GeneratorConfigError> {
        let Some(api_key) = env::var("QUIZ_AI_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
        else {
            return Ok(None);
        };

        let mut config = Self::new(api_key);
        if let Some(base_url) = non_blank_var("QUIZ_AI_BASE_URL") {
            config = config.with_base_url(base_url)?;
        }
        if let Some(model) = non_blank_var("QUIZ_AI_MODEL") {
            config = config.with_model(model);
        }
        if let Some(raw) = non_blank_var("QUIZ_QUESTION_COUNT") {
            let count = raw
                .parse::<u32>()
                .map_err(|_| GeneratorConfigError::InvalidQuestionCount(raw.clone()))?;
            config = config.with_question_count(count)?;
        }
        Ok(Some(config))
    }

    /// # Errors
    ///
    /// Returns `GeneratorConfigError::InvalidBaseUrl` if the URL does not parse.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, GeneratorConfigError> {
        let base_url = base_url.into().trim().to_string();
        if Url::parse(&base_url).is_err() {
            return Err(GeneratorConfigError::InvalidBaseUrl(base_url));
        }
        self.base_url = base_url;
        Ok(self)
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// # Errors
    ///
    /// Returns `GeneratorConfigError::ZeroQuestionCount` for a count of zero.
    pub fn with_question_count(mut self, count: u32) -> Result<Self, GeneratorConfigError> {
        if count == 0 {
            return Err(GeneratorConfigError::ZeroQuestionCount);
        }
        self.question_count = count;
        Ok(self)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    /// Full URL of the completions endpoint.
    #[must_use]
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_new_config() {
        let config = GeneratorConfig::new("key");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.question_count(), DEFAULT_QUESTION_COUNT);
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let config = GeneratorConfig::new("key")
            .with_base_url("http://localhost:8080/v1/")
            .unwrap();
        assert_eq!(config.completions_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = GeneratorConfig::new("key")
            .with_base_url("not a url")
            .unwrap_err();
        assert!(matches!(err, GeneratorConfigError::InvalidBaseUrl(_)));
    }

    #[test]
    fn zero_question_count_is_rejected() {
        let err = GeneratorConfig::new("key")
            .with_question_count(0)
            .unwrap_err();
        assert_eq!(err, GeneratorConfigError::ZeroQuestionCount);
    }
}

//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::QuestionError;

/// Errors emitted by question providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("question generation is not configured")]
    Disabled,
    #[error("question generation returned an empty response")]
    EmptyResponse,
    #[error("question generation request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid response format from question generator")]
    InvalidFormat,
    #[error("error parsing grammar questions: {0}")]
    Json(#[from] serde_json::Error),
    #[error("question {index} is malformed: {source}")]
    MalformedQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },
    #[error("question fixture unavailable: {0}")]
    Fixture(String),
}

/// Errors emitted while building a `GeneratorConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeneratorConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("question count must be at least 1")]
    ZeroQuestionCount,
    #[error("invalid question count: {0}")]
    InvalidQuestionCount(String),
}

/// Errors emitted while starting a quiz session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

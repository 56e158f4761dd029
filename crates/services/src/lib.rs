#![forbid(unsafe_code)]

pub mod ai;
pub mod error;
pub mod provider;
pub mod quiz;

pub use quiz_core::Clock;

pub use ai::{AiQuestionProvider, GeneratorConfig};
pub use error::{GeneratorConfigError, ProviderError, SessionError};
pub use provider::{InMemoryQuestionProvider, QuestionProvider};
pub use quiz::{
    FeedbackSheet, QuizEvent, QuizSession, QuizSessionBuilder, SessionPhase, SessionState,
    StateStream,
};

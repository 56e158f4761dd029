use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use quiz_core::model::{Difficulty, Question};

use crate::error::ProviderError;

/// Source of questions for a quiz session.
///
/// Implementations decide transport, format, batch length and ordering. They
/// must only hand out validated `Question`s; malformed input is reported as
/// an error instead.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    /// Fetch a fresh batch of questions for the given difficulty.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` when the batch cannot be produced.
    async fn fetch(&self, difficulty: Difficulty) -> Result<Vec<Question>, ProviderError>;
}

/// Simple in-memory provider for tests, demos and local fixtures.
///
/// Serves the batch registered for a difficulty, falling back to the default
/// batch. With neither, `fetch` fails with `ProviderError::Fixture`.
#[derive(Clone, Default)]
pub struct InMemoryQuestionProvider {
    inner: Arc<Mutex<Batches>>,
}

#[derive(Default)]
struct Batches {
    default: Option<Vec<Question>>,
    by_difficulty: HashMap<Difficulty, Vec<Question>>,
    fetches: Vec<Difficulty>,
}

impl InMemoryQuestionProvider {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        let provider = Self::default();
        provider.lock().default = Some(questions);
        provider
    }

    #[must_use]
    pub fn with_difficulty(self, difficulty: Difficulty, questions: Vec<Question>) -> Self {
        self.lock().by_difficulty.insert(difficulty, questions);
        self
    }

    /// Difficulties requested so far, in call order.
    #[must_use]
    pub fn fetches(&self) -> Vec<Difficulty> {
        self.lock().fetches.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Batches> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl QuestionProvider for InMemoryQuestionProvider {
    async fn fetch(&self, difficulty: Difficulty) -> Result<Vec<Question>, ProviderError> {
        let mut batches = self.lock();
        batches.fetches.push(difficulty);
        batches
            .by_difficulty
            .get(&difficulty)
            .or(batches.default.as_ref())
            .cloned()
            .ok_or_else(|| ProviderError::Fixture(format!("no {difficulty} questions loaded")))
    }
}

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Difficulty, OptionKey, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,
}

/// How a single question ended.
///
/// `Unanswered` means the countdown ran out before any option was picked; it
/// counts against the learner but is never recorded as a wrong pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub selected: Option<OptionKey>,
    pub verdict: Verdict,
}

impl QuestionOutcome {
    #[must_use]
    pub fn answered(question_id: QuestionId, selected: OptionKey, correct: OptionKey) -> Self {
        let verdict = if selected == correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };
        Self {
            question_id,
            selected: Some(selected),
            verdict,
        }
    }

    #[must_use]
    pub fn unanswered(question_id: QuestionId) -> Self {
        Self {
            question_id,
            selected: None,
            verdict: Verdict::Unanswered,
        }
    }
}

/// Running tally for one pass through a question list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    pub total: u32,
}

impl QuizScore {
    /// Tally outcomes against a list of `total` questions.
    #[must_use]
    pub fn tally(outcomes: &[QuestionOutcome], total: usize) -> Self {
        let mut score = Self {
            total: u32::try_from(total).unwrap_or(u32::MAX),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.verdict {
                Verdict::Correct => score.correct = score.correct.saturating_add(1),
                Verdict::Incorrect => score.incorrect = score.incorrect.saturating_add(1),
                Verdict::Unanswered => score.unanswered = score.unanswered.saturating_add(1),
            }
        }
        score
    }

    #[must_use]
    pub fn completed(&self) -> u32 {
        self.correct + self.incorrect + self.unanswered
    }

    /// Share of all questions answered correctly, in [0, 1].
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.total)
        }
    }
}

/// Score of a finished pass, with its time range.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSummary {
    difficulty: Difficulty,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    score: QuizScore,
}

impl QuizSummary {
    /// # Errors
    ///
    /// Returns `SummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    pub fn new(
        difficulty: Difficulty,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        score: QuizScore,
    ) -> Result<Self, SummaryError> {
        if completed_at < started_at {
            return Err(SummaryError::InvalidTimeRange);
        }
        Ok(Self {
            difficulty,
            started_at,
            completed_at,
            score,
        })
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn score(&self) -> QuizScore {
        self.score
    }

    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use quiz_core::model::{
    Difficulty, OptionKey, Question, QuestionOutcome, QuizScore, QuizSummary, SummaryError,
};

/// Conceptual state of a session, derived from the flags in `SessionState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Error,
    Empty,
    Presenting { timer_running: bool },
    AwaitingFeedbackAck { dialog_open: bool },
}

/// Snapshot of a quiz session.
///
/// Every transition produces a new value; observers never see a partially
/// applied update.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub questions: Arc<[Question]>,
    pub current_index: usize,
    pub selected_difficulty: Difficulty,
    pub selected_option: Option<OptionKey>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Answer and result are visible; no further selection is accepted.
    pub show_feedback: bool,
    pub show_feedback_dialog: bool,
    /// Remaining share of the question's time budget, 1 = untouched.
    pub timer_progress: f32,
    pub is_timer_running: bool,
    pub timer_expired: bool,
    pub outcomes: Vec<QuestionOutcome>,
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            questions: Arc::from(Vec::new()),
            current_index: 0,
            selected_difficulty: Difficulty::default(),
            selected_option: None,
            is_loading: false,
            error: None,
            show_feedback: false,
            show_feedback_dialog: false,
            timer_progress: 1.0,
            is_timer_running: false,
            timer_expired: false,
            outcomes: Vec::new(),
            started_at: None,
        }
    }
}

impl SessionState {
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// True on the final question, and also when there are no questions.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    /// No selection never counts as correct.
    #[must_use]
    pub fn is_correct_answer(&self) -> bool {
        match (self.selected_option, self.current_question()) {
            (Some(option), Some(question)) => question.is_correct(option),
            _ => false,
        }
    }

    /// Feedback for the picked option; after an unanswered expiry, the
    /// feedback for the correct option.
    #[must_use]
    pub fn current_feedback(&self) -> Option<&str> {
        let question = self.current_question()?;
        match self.selected_option {
            Some(option) => Some(question.feedback_for(option)),
            None if self.timer_expired => Some(question.feedback_for(question.answer())),
            None => None,
        }
    }

    #[must_use]
    pub fn question_duration(&self) -> Duration {
        self.selected_difficulty.time_budget()
    }

    /// Time left on the current question, derived from `timer_progress`.
    #[must_use]
    pub fn remaining_time(&self) -> Duration {
        let progress = if self.timer_progress.is_nan() {
            0.0
        } else {
            self.timer_progress.clamp(0.0, 1.0)
        };
        self.question_duration().mul_f32(progress)
    }

    #[must_use]
    pub fn score(&self) -> QuizScore {
        QuizScore::tally(&self.outcomes, self.questions.len())
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            return SessionPhase::Loading;
        }
        if self.error.is_some() {
            return SessionPhase::Error;
        }
        if self.current_question().is_none() {
            return SessionPhase::Empty;
        }
        if self.show_feedback {
            SessionPhase::AwaitingFeedbackAck {
                dialog_open: self.show_feedback_dialog,
            }
        } else {
            SessionPhase::Presenting {
                timer_running: self.is_timer_running,
            }
        }
    }

    /// Summarize the current pass as of `completed_at`.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::InvalidTimeRange` if `completed_at` is before the
    /// pass started.
    pub fn summary(&self, completed_at: DateTime<Utc>) -> Result<QuizSummary, SummaryError> {
        QuizSummary::new(
            self.selected_difficulty,
            self.started_at.unwrap_or(completed_at),
            completed_at,
            self.score(),
        )
    }
}

use quiz_core::model::OptionKey;

use crate::quiz::state::SessionState;

/// What the feedback modal shows for the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackSheet {
    pub is_correct: bool,
    pub selected: Option<OptionKey>,
    pub feedback_text: String,
    pub correct_key: OptionKey,
    pub correct_answer: String,
    pub is_time_expired: bool,
    pub is_last_question: bool,
}

impl FeedbackSheet {
    /// Build the sheet when the dialog is open and there is a question.
    #[must_use]
    pub fn from_state(state: &SessionState) -> Option<Self> {
        if !state.show_feedback_dialog {
            return None;
        }
        let question = state.current_question()?;
        Some(Self {
            is_correct: state.is_correct_answer(),
            selected: state.selected_option,
            feedback_text: state.current_feedback().unwrap_or_default().to_string(),
            correct_key: question.answer(),
            correct_answer: question.correct_text().to_string(),
            is_time_expired: state.timer_expired,
            is_last_question: state.is_last_question(),
        })
    }

    #[must_use]
    pub fn headline(&self) -> &'static str {
        if self.is_correct {
            "Correct!"
        } else if self.is_time_expired && self.selected.is_none() {
            "Time's up!"
        } else {
            "Not quite"
        }
    }

    /// Label of the single action the sheet offers.
    #[must_use]
    pub fn action_label(&self) -> &'static str {
        if self.is_last_question {
            "Restart quiz"
        } else {
            "Next question"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuestionDraft};

    fn question() -> Question {
        QuestionDraft::new(1, "If I ___ you, I would rest.", "D")
            .with_choice("A", "am", "Present tense does not fit.")
            .with_choice("B", "was", "Informal; the subjunctive is expected.")
            .with_choice("C", "be", "Bare form.")
            .with_choice("D", "were", "Second conditional uses were.")
            .validate()
            .unwrap()
    }

    fn state() -> SessionState {
        SessionState {
            questions: vec![question(), question()].into(),
            ..SessionState::default()
        }
    }

    #[test]
    fn closed_dialog_has_no_sheet() {
        assert!(FeedbackSheet::from_state(&state()).is_none());
    }

    #[test]
    fn correct_pick() {
        let state = SessionState {
            selected_option: Some(OptionKey::D),
            show_feedback: true,
            show_feedback_dialog: true,
            ..state()
        };
        let sheet = FeedbackSheet::from_state(&state).unwrap();
        assert!(sheet.is_correct);
        assert_eq!(sheet.headline(), "Correct!");
        assert_eq!(sheet.feedback_text, "Second conditional uses were.");
        assert_eq!(sheet.action_label(), "Next question");
    }

    #[test]
    fn time_expired_without_pick_shows_correct_answer() {
        let state = SessionState {
            current_index: 1,
            show_feedback: true,
            show_feedback_dialog: true,
            timer_expired: true,
            timer_progress: 0.0,
            ..state()
        };
        let sheet = FeedbackSheet::from_state(&state).unwrap();
        assert!(!sheet.is_correct);
        assert_eq!(sheet.selected, None);
        assert_eq!(sheet.headline(), "Time's up!");
        assert_eq!(sheet.correct_key, OptionKey::D);
        assert_eq!(sheet.correct_answer, "were");
        assert_eq!(sheet.feedback_text, "Second conditional uses were.");
        assert_eq!(sheet.action_label(), "Restart quiz");
    }

    #[test]
    fn wrong_pick() {
        let state = SessionState {
            selected_option: Some(OptionKey::B),
            show_feedback: true,
            show_feedback_dialog: true,
            ..state()
        };
        let sheet = FeedbackSheet::from_state(&state).unwrap();
        assert_eq!(sheet.headline(), "Not quite");
        assert_eq!(sheet.feedback_text, "Informal; the subjunctive is expected.");
    }
}

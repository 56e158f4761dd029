use quiz_core::Clock;
use quiz_core::model::{Question, QuestionId};
use services::{FeedbackSheet, SessionPhase, SessionState};

/// Turns the state stream into transcript lines, printing each thing once.
pub struct Renderer {
    clock: Clock,
    was_loading: bool,
    error: Option<String>,
    presented: Option<(usize, QuestionId)>,
    had_feedback: bool,
    was_running: bool,
    dialog_open: bool,
    decile: Option<u32>,
}

impl Renderer {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            was_loading: false,
            error: None,
            presented: None,
            had_feedback: false,
            was_running: false,
            dialog_open: false,
            decile: None,
        }
    }

    pub fn render(&mut self, state: &SessionState) -> Vec<String> {
        let mut out = Vec::new();

        if state.is_loading {
            if !self.was_loading {
                out.push(format!(
                    "Loading {} questions...",
                    state.selected_difficulty
                ));
            }
            self.was_loading = true;
            self.presented = None;
            self.dialog_open = false;
            self.was_running = false;
            return out;
        }
        let finished_loading = std::mem::replace(&mut self.was_loading, false);

        if state.error != self.error {
            if let Some(error) = &state.error {
                out.push(format!("Could not load questions: {error}"));
                out.push("Press l to try again.".to_string());
            }
            self.error.clone_from(&state.error);
        }
        if finished_loading && state.phase() == SessionPhase::Empty {
            out.push("No questions available. Press l to reload.".to_string());
        }

        let Some(question) = state.current_question() else {
            self.presented = None;
            return out;
        };

        let key = (state.current_index, question.id());
        let fresh = self.presented != Some(key) || (self.had_feedback && !state.show_feedback);
        if fresh {
            self.presented = Some(key);
            self.decile = None;
            self.dialog_open = false;
            out.extend(question_lines(state, question));
        }
        self.had_feedback = state.show_feedback;

        if state.is_timer_running {
            let decile = countdown_decile(state.timer_progress);
            if self.decile != Some(decile) {
                if decile < 10 {
                    out.push(countdown_line(state));
                }
                self.decile = Some(decile);
            }
        } else if self.was_running && !state.show_feedback && !state.timer_expired {
            out.push("Timer paused. Press u to resume.".to_string());
        }
        self.was_running = state.is_timer_running;

        if state.show_feedback_dialog && !self.dialog_open {
            if let Some(sheet) = FeedbackSheet::from_state(state) {
                out.extend(self.sheet_lines(state, &sheet));
            }
        }
        self.dialog_open = state.show_feedback_dialog;

        out
    }

    fn sheet_lines(&self, state: &SessionState, sheet: &FeedbackSheet) -> Vec<String> {
        let mut lines = vec![String::new(), sheet.headline().to_string()];
        match sheet.selected {
            Some(key) => lines.push(format!("Your answer: {key}")),
            None => lines.push("No answer given.".to_string()),
        }
        lines.push(format!(
            "Correct answer: {}) {}",
            sheet.correct_key, sheet.correct_answer
        ));
        lines.push(sheet.feedback_text.clone());

        if sheet.is_last_question {
            match state.summary(self.clock.now()) {
                Ok(summary) => {
                    let score = summary.score();
                    lines.push(format!(
                        "Quiz complete ({}): {}/{} correct, {} wrong, {} unanswered in {}s.",
                        summary.difficulty(),
                        score.correct,
                        score.total,
                        score.incorrect,
                        score.unanswered,
                        summary.duration().num_seconds()
                    ));
                }
                Err(err) => tracing::debug!(error = %err, "no quiz summary"),
            }
            lines.push(format!("Press r: {}.", sheet.action_label()));
        } else {
            lines.push(format!("Press n: {}.", sheet.action_label()));
        }
        lines
    }
}

fn question_lines(state: &SessionState, question: &Question) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Question {}/{} ({})",
            state.current_index + 1,
            state.questions.len(),
            state.selected_difficulty
        ),
        question.sentence().to_string(),
    ];
    lines.extend(
        question
            .choices()
            .iter()
            .map(|choice| format!("  {}) {}", choice.key(), choice.text())),
    );
    lines
}

/// Tenths of the budget left, rounded up; 10 while untouched.
fn countdown_decile(progress: f32) -> u32 {
    (progress.clamp(0.0, 1.0) * 10.0).ceil() as u32
}

fn countdown_line(state: &SessionState) -> String {
    let decile = countdown_decile(state.timer_progress) as usize;
    format!(
        "  [{}{}] {}s left",
        "#".repeat(decile),
        ".".repeat(10 - decile),
        state.remaining_time().as_secs_f32().ceil()
    )
}

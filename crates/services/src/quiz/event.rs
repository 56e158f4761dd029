use quiz_core::model::{Difficulty, OptionKey};

/// Everything a consumer can ask a `QuizSession` to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuizEvent {
    LoadQuestions,
    /// Replaces the whole session; ignored when the difficulty is unchanged.
    SelectDifficulty(Difficulty),
    SelectAnswer(OptionKey),
    NextQuestion,
    RestartQuiz,
    StartTimer,
    PauseTimer,
    ResumeTimer,
    /// Externally driven progress; never raises it and never reaches zero.
    UpdateTimerProgress(f32),
    /// Normally raised by the countdown itself.
    TimerExpired,
    ShowFeedbackDialog,
    HideFeedbackDialog,
}

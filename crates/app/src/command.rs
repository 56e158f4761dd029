use std::fmt;

use quiz_core::model::{Difficulty, OptionKey};
use services::QuizEvent;

/// One line of learner input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Answer(OptionKey),
    Next,
    Restart,
    Reload,
    Pause,
    Resume,
    Feedback,
    Difficulty(Difficulty),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError(String);

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command: {} (type ? for help)", self.0)
    }
}

impl std::error::Error for CommandError {}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let trimmed = line.trim();
        let mut chars = trimmed.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return Err(CommandError(trimmed.to_string()));
        };
        if let Ok(key) = OptionKey::try_from(ch) {
            return Ok(Self::Answer(key));
        }
        match ch.to_ascii_lowercase() {
            'n' => Ok(Self::Next),
            'r' => Ok(Self::Restart),
            'l' => Ok(Self::Reload),
            'p' => Ok(Self::Pause),
            'u' => Ok(Self::Resume),
            'f' => Ok(Self::Feedback),
            'e' => Ok(Self::Difficulty(Difficulty::Easy)),
            'm' => Ok(Self::Difficulty(Difficulty::Medium)),
            'h' => Ok(Self::Difficulty(Difficulty::Hard)),
            '?' => Ok(Self::Help),
            'q' => Ok(Self::Quit),
            _ => Err(CommandError(trimmed.to_string())),
        }
    }

    /// Session events for this command, in dispatch order.
    pub fn events(self) -> Vec<QuizEvent> {
        match self {
            Self::Answer(key) => vec![QuizEvent::SelectAnswer(key)],
            // The sheet is dismissed before moving on.
            Self::Next => vec![QuizEvent::HideFeedbackDialog, QuizEvent::NextQuestion],
            Self::Restart => vec![QuizEvent::HideFeedbackDialog, QuizEvent::RestartQuiz],
            Self::Reload => vec![QuizEvent::LoadQuestions],
            Self::Pause => vec![QuizEvent::PauseTimer],
            Self::Resume => vec![QuizEvent::ResumeTimer],
            Self::Feedback => vec![QuizEvent::ShowFeedbackDialog],
            Self::Difficulty(difficulty) => vec![QuizEvent::SelectDifficulty(difficulty)],
            Self::Help | Self::Quit => Vec::new(),
        }
    }
}

pub const HELP: &str = "\
Commands:
  a b c d   answer the current question
  n         next question
  r         restart the quiz
  l         reload questions
  p / u     pause / resume the timer
  f         show the feedback again
  e m h     switch to easy, medium or hard
  ?         this help
  q         quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_a_to_d_answer() {
        assert_eq!(Command::parse("c"), Ok(Command::Answer(OptionKey::C)));
        assert_eq!(Command::parse(" D \n"), Ok(Command::Answer(OptionKey::D)));
    }

    #[test]
    fn difficulty_keys() {
        assert_eq!(
            Command::parse("h"),
            Ok(Command::Difficulty(Difficulty::Hard))
        );
        assert_eq!(
            Command::parse("E"),
            Ok(Command::Difficulty(Difficulty::Easy))
        );
    }

    #[test]
    fn rejects_unknown_or_long_input() {
        assert!(Command::parse("x").is_err());
        assert!(Command::parse("next").is_err());
        assert!(Command::parse("").is_err());
    }

    #[test]
    fn next_and_restart_close_the_sheet_first() {
        assert_eq!(
            Command::Next.events(),
            vec![QuizEvent::HideFeedbackDialog, QuizEvent::NextQuestion]
        );
        assert_eq!(
            Command::Restart.events(),
            vec![QuizEvent::HideFeedbackDialog, QuizEvent::RestartQuiz]
        );
        assert!(Command::Quit.events().is_empty());
    }
}

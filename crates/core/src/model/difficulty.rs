use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty: {0:?} (expected easy, medium or hard)")]
pub struct DifficultyParseError(pub String);

/// Question difficulty. Fixes both the tone of generated content and the
/// per-question time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Lowercase label used in prompts and on the command line.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Time the learner gets for a single question.
    #[must_use]
    pub fn time_budget(self) -> Duration {
        match self {
            Difficulty::Easy => Duration::from_millis(30_000),
            Difficulty::Medium => Duration::from_millis(20_000),
            Difficulty::Hard => Duration::from_millis(15_000),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "e" => Ok(Difficulty::Easy),
            "medium" | "m" => Ok(Difficulty::Medium),
            "hard" | "h" => Ok(Difficulty::Hard),
            _ => Err(DifficultyParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budgets_match_levels() {
        assert_eq!(Difficulty::Easy.time_budget(), Duration::from_secs(30));
        assert_eq!(Difficulty::Medium.time_budget(), Duration::from_secs(20));
        assert_eq!(Difficulty::Hard.time_budget(), Duration::from_secs(15));
    }

    #[test]
    fn default_is_easy() {
        assert_eq!(Difficulty::default(), Difficulty::Easy);
    }

    #[test]
    fn parses_labels_and_shorthands() {
        assert_eq!("Medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(" h ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        let err = "expert".parse::<Difficulty>().unwrap_err();
        assert_eq!(err, DifficultyParseError("expert".into()));
    }

    #[test]
    fn label_round_trips_through_from_str() {
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.label().parse::<Difficulty>().unwrap(), difficulty);
        }
    }
}

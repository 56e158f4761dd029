use thiserror::Error;

use crate::model::{DifficultyParseError, OptionKeyError, QuestionError, SummaryError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    OptionKey(#[from] OptionKeyError),
    #[error(transparent)]
    Difficulty(#[from] DifficultyParseError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, OptionKey};

    fn parse_pick(difficulty: &str, key: &str) -> Result<(Difficulty, OptionKey), Error> {
        Ok((difficulty.parse()?, key.parse()?))
    }

    #[test]
    fn model_errors_convert() {
        assert!(parse_pick("hard", "b").is_ok());
        assert!(matches!(parse_pick("extreme", "b"), Err(Error::Difficulty(_))));
        assert!(matches!(parse_pick("easy", "z"), Err(Error::OptionKey(_))));
    }
}

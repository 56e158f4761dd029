mod difficulty;
mod ids;
mod outcome;
mod question;

pub use difficulty::{Difficulty, DifficultyParseError};
pub use ids::{ParseIdError, QuestionId};
pub use outcome::{QuestionOutcome, QuizScore, QuizSummary, SummaryError, Verdict};
pub use question::{Choice, DraftField, OptionKey, OptionKeyError, Question, QuestionDraft, QuestionError};

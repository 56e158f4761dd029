use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid option key: {0:?}")]
pub struct OptionKeyError(pub String);

/// Which keyed map of a draft an ingestion error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Options,
    Feedback,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftField::Options => f.write_str("options"),
            DraftField::Feedback => f.write_str("feedback"),
        }
    }
}

/// Reasons a provider-supplied question is rejected at ingestion.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question sentence is empty")]
    EmptySentence,

    #[error("unknown {field} key {key:?}")]
    UnknownKey { field: DraftField, key: String },

    #[error("duplicate {field} key {key}")]
    DuplicateKey { field: DraftField, key: OptionKey },

    #[error("missing option {0}")]
    MissingOption(OptionKey),

    #[error("option {0} has no text")]
    BlankOption(OptionKey),

    #[error("missing feedback for option {0}")]
    MissingFeedback(OptionKey),

    #[error("answer {0:?} is not one of A, B, C or D")]
    InvalidAnswer(String),
}

//
// ─── OPTION KEY ────────────────────────────────────────────────────────────────
//

/// One of the four answer slots of a multiple-choice question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    pub const ALL: [OptionKey; 4] = [OptionKey::A, OptionKey::B, OptionKey::C, OptionKey::D];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptionKey::A => "A",
            OptionKey::B => "B",
            OptionKey::C => "C",
            OptionKey::D => "D",
        }
    }

    /// Position in A..D order.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            OptionKey::A => 0,
            OptionKey::B => 1,
            OptionKey::C => 2,
            OptionKey::D => 3,
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<char> for OptionKey {
    type Error = OptionKeyError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase() {
            'A' => Ok(OptionKey::A),
            'B' => Ok(OptionKey::B),
            'C' => Ok(OptionKey::C),
            'D' => Ok(OptionKey::D),
            _ => Err(OptionKeyError(value.to_string())),
        }
    }
}

impl FromStr for OptionKey {
    type Err = OptionKeyError;

    /// Accepts a single letter, case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => OptionKey::try_from(ch).map_err(|_| OptionKeyError(s.to_string())),
            _ => Err(OptionKeyError(s.to_string())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single answer slot: its text and the explanation shown for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    key: OptionKey,
    text: String,
    feedback: String,
}

impl Choice {
    #[must_use]
    pub fn key(&self) -> OptionKey {
        self.key
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.feedback
    }
}

/// A validated multiple-choice grammar question.
///
/// Choices are stored in A..D order and every choice carries its own
/// feedback, so options and feedback always share the same key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    sentence: String,
    choices: [Choice; 4],
    answer: OptionKey,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    /// Sentence with `___` blank markers.
    #[must_use]
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice; 4] {
        &self.choices
    }

    #[must_use]
    pub fn choice(&self, key: OptionKey) -> &Choice {
        &self.choices[key.index()]
    }

    #[must_use]
    pub fn option_text(&self, key: OptionKey) -> &str {
        self.choice(key).text()
    }

    #[must_use]
    pub fn feedback_for(&self, key: OptionKey) -> &str {
        self.choice(key).feedback()
    }

    #[must_use]
    pub fn answer(&self) -> OptionKey {
        self.answer
    }

    #[must_use]
    pub fn is_correct(&self, key: OptionKey) -> bool {
        self.answer == key
    }

    /// Text of the correct option.
    #[must_use]
    pub fn correct_text(&self) -> &str {
        self.option_text(self.answer)
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Question as it arrives from a provider, before any invariant is checked.
///
/// Field names follow the generation schema; extra fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub id: i64,
    pub sentence: String,
    pub options: BTreeMap<String, String>,
    pub answer: String,
    pub feedback: BTreeMap<String, String>,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(id: i64, sentence: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id,
            sentence: sentence.into(),
            answer: answer.into(),
            ..Self::default()
        }
    }

    /// Adds (or replaces) one option together with its feedback.
    #[must_use]
    pub fn with_choice(
        mut self,
        key: impl Into<String>,
        text: impl Into<String>,
        feedback: impl Into<String>,
    ) -> Self {
        let key = key.into();
        self.options.insert(key.clone(), text.into());
        self.feedback.insert(key, feedback.into());
        self
    }

    /// Check the draft and turn it into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the sentence is blank, a key is not A–D,
    /// an option or its feedback is missing, an option is blank, or the
    /// answer is not one of the four keys.
    pub fn validate(self) -> Result<Question, QuestionError> {
        let sentence = self.sentence.trim().to_string();
        if sentence.is_empty() {
            return Err(QuestionError::EmptySentence);
        }

        let mut options = keyed_slots(self.options, DraftField::Options)?;
        let mut feedback = keyed_slots(self.feedback, DraftField::Feedback)?;

        for key in OptionKey::ALL {
            match options[key.index()].as_deref() {
                None => return Err(QuestionError::MissingOption(key)),
                Some(text) if text.trim().is_empty() => {
                    return Err(QuestionError::BlankOption(key));
                }
                Some(_) => {}
            }
            if feedback[key.index()].is_none() {
                return Err(QuestionError::MissingFeedback(key));
            }
        }

        let answer = self
            .answer
            .parse::<OptionKey>()
            .map_err(|_| QuestionError::InvalidAnswer(self.answer.clone()))?;

        let choices = OptionKey::ALL.map(|key| Choice {
            key,
            text: options[key.index()].take().unwrap_or_default().trim().to_string(),
            feedback: feedback[key.index()].take().unwrap_or_default().trim().to_string(),
        });

        Ok(Question {
            id: QuestionId::new(self.id),
            sentence,
            choices,
            answer,
        })
    }
}

fn keyed_slots(
    map: BTreeMap<String, String>,
    field: DraftField,
) -> Result<[Option<String>; 4], QuestionError> {
    let mut slots: [Option<String>; 4] = Default::default();
    for (raw, value) in map {
        let key = raw
            .parse::<OptionKey>()
            .map_err(|_| QuestionError::UnknownKey { field, key: raw })?;
        let slot = &mut slots[key.index()];
        if slot.is_some() {
            return Err(QuestionError::DuplicateKey { field, key });
        }
        *slot = Some(value);
    }
    Ok(slots)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> QuestionDraft {
        QuestionDraft::new(1, "She ___ to school every day.", "C")
            .with_choice("A", "go", "Needs the third-person -s.")
            .with_choice("B", "going", "A bare participle cannot be the main verb.")
            .with_choice("C", "goes", "Correct: present simple, third person.")
            .with_choice("D", "gone", "Past participle needs an auxiliary.")
    }

    #[test]
    fn option_key_parsing_is_lenient_about_case_and_space() {
        assert_eq!(" c ".parse::<OptionKey>().unwrap(), OptionKey::C);
        assert_eq!(OptionKey::try_from('b').unwrap(), OptionKey::B);
        assert!("E".parse::<OptionKey>().is_err());
        assert!("AB".parse::<OptionKey>().is_err());
        assert!("".parse::<OptionKey>().is_err());
    }

    #[test]
    fn valid_draft_keeps_a_to_d_order() {
        let question = draft().validate().unwrap();
        let keys: Vec<_> = question.choices().iter().map(Choice::key).collect();
        assert_eq!(keys, OptionKey::ALL.to_vec());
        assert_eq!(question.answer(), OptionKey::C);
        assert_eq!(question.correct_text(), "goes");
        assert_eq!(question.feedback_for(OptionKey::A), "Needs the third-person -s.");
        assert!(question.is_correct(OptionKey::C));
        assert!(!question.is_correct(OptionKey::D));
    }

    #[test]
    fn lowercase_keys_are_normalized() {
        let mut d = draft();
        let text = d.options.remove("B").unwrap();
        d.options.insert("b".into(), text);
        d.answer = "c".into();
        let question = d.validate().unwrap();
        assert_eq!(question.option_text(OptionKey::B), "going");
        assert_eq!(question.answer(), OptionKey::C);
    }

    #[test]
    fn blank_sentence_is_rejected() {
        let mut d = draft();
        d.sentence = "   ".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::EmptySentence);
    }

    #[test]
    fn missing_feedback_key_is_rejected() {
        let mut d = draft();
        d.feedback.remove("D");
        assert_eq!(
            d.validate().unwrap_err(),
            QuestionError::MissingFeedback(OptionKey::D)
        );
    }

    #[test]
    fn missing_option_is_rejected() {
        let mut d = draft();
        d.options.remove("A");
        assert_eq!(d.validate().unwrap_err(), QuestionError::MissingOption(OptionKey::A));
    }

    #[test]
    fn extra_key_is_rejected() {
        let d = draft().with_choice("E", "went", "Not an option.");
        let err = d.validate().unwrap_err();
        assert!(matches!(
            err,
            QuestionError::UnknownKey { field: DraftField::Options, ref key } if key == "E"
        ));
    }

    #[test]
    fn duplicate_key_after_normalization_is_rejected() {
        let d = draft().with_choice("a", "goes", "dup");
        assert!(matches!(
            d.validate().unwrap_err(),
            QuestionError::DuplicateKey { key: OptionKey::A, .. }
        ));
    }

    #[test]
    fn answer_outside_key_set_is_rejected() {
        let mut d = draft();
        d.answer = "E".into();
        assert_eq!(d.validate().unwrap_err(), QuestionError::InvalidAnswer("E".into()));
    }

    #[test]
    fn blank_option_text_is_rejected() {
        let d = draft().with_choice("B", "  ", "fine");
        assert_eq!(d.validate().unwrap_err(), QuestionError::BlankOption(OptionKey::B));
    }

    #[test]
    fn draft_deserializes_from_generation_schema() {
        let json = r#"{
            "id": 4,
            "difficulty": "easy",
            "sentence": "They ___ happy.",
            "options": {"A": "is", "B": "are", "C": "am", "D": "be"},
            "answer": "B",
            "feedback": {"A": "Singular.", "B": "Correct.", "C": "First person.", "D": "Bare form."}
        }"#;
        let d: QuestionDraft = serde_json::from_str(json).unwrap();
        let question = d.validate().unwrap();
        assert_eq!(question.id(), QuestionId::new(4));
        assert_eq!(question.correct_text(), "are");
    }
}

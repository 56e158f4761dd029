use quiz_core::model::{Question, QuestionDraft};

use crate::error::ProviderError;

/// Slice from the first `[` to the last `]`, if there is one.
///
/// Models often wrap the array in prose or code fences.
#[must_use]
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

/// Parse a model reply into validated questions.
///
/// One malformed element rejects the whole batch.
///
/// # Errors
///
/// Returns `ProviderError::InvalidFormat` if no JSON array is present,
/// `ProviderError::Json` if it does not match the schema, and
/// `ProviderError::MalformedQuestion` if a question breaks an invariant.
pub fn parse_questions(reply: &str) -> Result<Vec<Question>, ProviderError> {
    let json = extract_json_array(reply.trim()).ok_or(ProviderError::InvalidFormat)?;
    let drafts: Vec<QuestionDraft> = serde_json::from_str(json)?;
    drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            draft
                .validate()
                .map_err(|source| ProviderError::MalformedQuestion { index, source })
        })
        .collect()
}

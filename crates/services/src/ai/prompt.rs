use quiz_core::model::Difficulty;

/// Build the generation prompt for `count` questions at `difficulty`.
#[must_use]
pub fn question_prompt(difficulty: Difficulty, count: u32) -> String {
    format!(
        r#"Generate {count} English grammar practice questions in JSON format at the '{label}' difficulty level.

Difficulty levels:
- "easy": short sentences with 1 blank; basic grammar (tenses, articles, simple prepositions)
- "medium": longer or compound sentences with up to 2 blanks; intermediate grammar (conjunctions, irregular verbs, time expressions)
- "hard": long, academic or complex sentences with 2 or more blanks; advanced grammar (conditionals, modals, passive voice, phrasal verbs)

Each question must include:
- a sentence with one or more blanks written as ___
- 4 multiple-choice options keyed A, B, C and D
- the key of the correct option (for example "C")
- one feedback sentence for every option explaining why it is right or wrong

Use this JSON schema:

GrammarQuestion = {{
  "id": int,
  "difficulty": str,
  "sentence": str,
  "options": {{ "A": str, "B": str, "C": str, "D": str }},
  "answer": str,
  "feedback": {{ "A": str, "B": str, "C": str, "D": str }}
}}

Return: list[GrammarQuestion]"#,
        label = difficulty.label(),
    )
}

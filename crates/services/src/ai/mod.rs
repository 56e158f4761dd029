pub mod config;
pub mod generator;
pub mod parse;
pub mod prompt;

pub use config::GeneratorConfig;
pub use generator::AiQuestionProvider;
pub use parse::{extract_json_array, parse_questions};
pub use prompt::question_prompt;

mod command;
mod render;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::Difficulty;
use services::ai::parse_questions;
use services::{AiQuestionProvider, InMemoryQuestionProvider, QuestionProvider, QuizSession};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::command::{Command, HELP};
use crate::render::Renderer;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDifficulty { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDifficulty { raw } => {
                write!(f, "invalid --difficulty value: {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    difficulty: Difficulty,
    questions: Option<PathBuf>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--difficulty <easy|medium|hard>] [--questions <file.json>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --difficulty easy");
    eprintln!("  questions are generated through the AI service");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DIFFICULTY, QUIZ_AI_API_KEY, QUIZ_AI_BASE_URL, QUIZ_AI_MODEL,");
    eprintln!("  QUIZ_QUESTION_COUNT, RUST_LOG");
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env_difficulty: Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut difficulty = env_difficulty
            .and_then(|value| value.parse::<Difficulty>().ok())
            .unwrap_or_default();
        let mut questions = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    difficulty = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                }
                "--questions" => {
                    questions = Some(PathBuf::from(require_value(args, "--questions")?));
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(Self {
            difficulty,
            questions,
        }))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn build_provider(args: &Args) -> Result<Arc<dyn QuestionProvider>, Box<dyn std::error::Error>> {
    if let Some(path) = &args.questions {
        let raw = std::fs::read_to_string(path)?;
        let questions = parse_questions(&raw)?;
        info!(count = questions.len(), path = %path.display(), "using question file");
        return Ok(Arc::new(InMemoryQuestionProvider::new(questions)));
    }

    let provider = AiQuestionProvider::from_env()?;
    if !provider.enabled() {
        warn!("QUIZ_AI_API_KEY is not set; question loading will fail");
    }
    Ok(Arc::new(provider))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv, std::env::var("QUIZ_DIFFICULTY").ok()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let Some(parsed) = parsed else {
        print_usage();
        return Ok(());
    };

    init_tracing();
    let provider = build_provider(&parsed)?;
    let session = QuizSession::builder(provider)
        .with_difficulty(parsed.difficulty)
        .start()?;

    let mut states = session.observe();
    let printer = tokio::spawn(async move {
        let mut renderer = Renderer::new(Clock::default());
        while let Some(state) = states.next().await {
            for line in renderer.render(&state) {
                println!("{line}");
            }
        }
    });

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{HELP}"),
            Ok(command) => {
                for event in command.events() {
                    session.dispatch(event);
                }
            }
            Err(err) => eprintln!("{err}"),
        }
    }

    session.shutdown();
    printer.await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str], env: Option<&str>) -> Result<Option<Args>, ArgsError> {
        let mut iter = args.iter().map(|arg| arg.to_string());
        Args::parse(&mut iter, env.map(str::to_string))
    }

    #[test]
    fn defaults_to_easy_without_file() {
        let args = parse(&[], None).unwrap().unwrap();
        assert_eq!(
            args,
            Args {
                difficulty: Difficulty::Easy,
                questions: None
            }
        );
    }

    #[test]
    fn flag_overrides_env() {
        let args = parse(&["--difficulty", "hard"], Some("medium"))
            .unwrap()
            .unwrap();
        assert_eq!(args.difficulty, Difficulty::Hard);

        let args = parse(&[], Some("medium")).unwrap().unwrap();
        assert_eq!(args.difficulty, Difficulty::Medium);
    }

    #[test]
    fn invalid_env_falls_back_to_default() {
        let args = parse(&[], Some("impossible")).unwrap().unwrap();
        assert_eq!(args.difficulty, Difficulty::Easy);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse(&["--difficulty", "extreme"], None),
            Err(ArgsError::InvalidDifficulty { .. })
        ));
        assert!(matches!(
            parse(&["--questions"], None),
            Err(ArgsError::MissingValue { flag: "--questions" })
        ));
        assert!(matches!(
            parse(&["--deck"], None),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse(&["--help"], None).unwrap().is_none());
    }

    #[test]
    fn demo_question_file_parses() {
        let questions = parse_questions(include_str!("../../../demos/questions.json")).unwrap();
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| !q.sentence().is_empty()));
    }

    #[test]
    fn questions_file_is_kept() {
        let args = parse(&["--questions", "qs.json"], None).unwrap().unwrap();
        assert_eq!(args.questions, Some(PathBuf::from("qs.json")));
    }
}

//! Quiz session state machine: progression, countdown, scoring and the
//! feedback dialog.

pub mod event;
pub mod feedback;
pub mod session;
pub mod state;
pub mod timer;

pub use event::QuizEvent;
pub use feedback::FeedbackSheet;
pub use session::{QuizSession, QuizSessionBuilder, StateStream};
pub use state::{SessionPhase, SessionState};
pub use timer::TICK_INTERVAL;

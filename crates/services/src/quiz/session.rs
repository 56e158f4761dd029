use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use quiz_core::model::{Difficulty, OptionKey, Question, QuestionOutcome};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::Clock;
use crate::error::{ProviderError, SessionError};
use crate::provider::QuestionProvider;
use crate::quiz::event::QuizEvent;
use crate::quiz::state::SessionState;
use crate::quiz::timer::{Countdown, TICK_INTERVAL, Tick, TimerHandle, spawn_countdown};

const FALLBACK_LOAD_ERROR: &str = "An error occurred while loading questions";

/// Stream of session snapshots returned by `QuizSession::observe`.
pub type StateStream = UnboundedReceiverStream<SessionState>;

/// Configures and starts a `QuizSession`.
pub struct QuizSessionBuilder {
    provider: Arc<dyn QuestionProvider>,
    clock: Clock,
    tick_interval: Duration,
    difficulty: Difficulty,
    runtime: Option<Handle>,
}

impl QuizSessionBuilder {
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Difficulty of the first load.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Runtime that hosts the countdown and provider tasks. Defaults to the
    /// runtime `start` is called from.
    #[must_use]
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Create the session and begin loading questions.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoRuntime` when no runtime was given and the
    /// caller is not inside a tokio runtime.
    pub fn start(self) -> Result<QuizSession, SessionError> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current()?,
        };
        let state = SessionState {
            selected_difficulty: self.difficulty,
            ..SessionState::default()
        };
        let shared = Arc::new(Shared {
            provider: self.provider,
            runtime,
            clock: self.clock,
            tick_interval: self.tick_interval,
            core: Mutex::new(Core {
                state,
                subscribers: Vec::new(),
                timer: None,
                timer_generation: 0,
                load_generation: 0,
                fetch: None,
                closed: false,
            }),
        });
        let session = QuizSession { shared };
        session.dispatch(QuizEvent::LoadQuestions);
        Ok(session)
    }
}

/// One running quiz: question list, progression, countdown and feedback.
///
/// All mutations go through one lock and are emitted to observers before it
/// is released, so every observer sees every state in mutation order.
/// Dropping the session tears it down.
pub struct QuizSession {
    shared: Arc<Shared>,
}

impl QuizSession {
    #[must_use]
    pub fn builder(provider: Arc<dyn QuestionProvider>) -> QuizSessionBuilder {
        QuizSessionBuilder {
            provider,
            clock: Clock::default(),
            tick_interval: TICK_INTERVAL,
            difficulty: Difficulty::default(),
            runtime: None,
        }
    }

    /// Start a session with default settings on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoRuntime` outside a tokio runtime.
    pub fn new(provider: Arc<dyn QuestionProvider>) -> Result<Self, SessionError> {
        Self::builder(provider).start()
    }

    /// Apply an event. Never blocks on I/O; asynchronous results arrive on
    /// the state stream. Events with no valid target are ignored.
    pub fn dispatch(&self, event: QuizEvent) {
        let mut core = self.shared.lock();
        if core.closed {
            return;
        }
        debug!(?event, "quiz event");
        self.shared.handle(&mut core, event);
    }

    /// Subscribe to state changes. The stream yields the current state first.
    #[must_use]
    pub fn observe(&self) -> StateStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut core = self.shared.lock();
        if tx.send(core.state.clone()).is_ok() && !core.closed {
            core.subscribers.push(tx);
        }
        UnboundedReceiverStream::new(rx)
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.lock().state.clone()
    }

    /// Cancel the countdown, discard any in-flight fetch and close all
    /// observer streams. Later dispatches are ignored.
    pub fn shutdown(&self) {
        let mut core = self.shared.lock();
        if core.closed {
            return;
        }
        core.closed = true;
        core.cancel_timer();
        core.abort_fetch();
        core.state.is_timer_running = false;
        core.subscribers.clear();
        debug!("quiz session shut down");
    }
}

impl Drop for QuizSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Shared {
    provider: Arc<dyn QuestionProvider>,
    runtime: Handle,
    clock: Clock,
    tick_interval: Duration,
    core: Mutex<Core>,
}

struct Core {
    state: SessionState,
    subscribers: Vec<mpsc::UnboundedSender<SessionState>>,
    timer: Option<TimerHandle>,
    /// Bumped on every start and cancel; ticks carrying an older value are dropped.
    timer_generation: u64,
    /// Bumped on every load; only the latest fetch may land.
    load_generation: u64,
    fetch: Option<JoinHandle<()>>,
    closed: bool,
}

impl Core {
    /// Replace the state with a modified copy and emit it if anything changed.
    fn update(&mut self, f: impl FnOnce(&mut SessionState)) {
        let mut next = self.state.clone();
        f(&mut next);
        if next == self.state {
            return;
        }
        self.state = next;
        let state = &self.state;
        self.subscribers.retain(|tx| tx.send(state.clone()).is_ok());
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.timer_generation += 1;
    }

    fn pause_timer(&mut self) {
        self.cancel_timer();
        self.update(|s| s.is_timer_running = false);
    }

    fn abort_fetch(&mut self) {
        if let Some(fetch) = self.fetch.take() {
            fetch.abort();
        }
        self.load_generation += 1;
    }

    fn select_answer(&mut self, option: OptionKey) {
        if self.state.show_feedback {
            return;
        }
        let Some(question) = self.state.current_question() else {
            return;
        };
        let outcome = QuestionOutcome::answered(question.id(), option, question.answer());
        self.cancel_timer();
        self.update(|s| {
            s.is_timer_running = false;
            s.selected_option = Some(option);
            s.show_feedback = true;
            s.show_feedback_dialog = true;
            s.outcomes.push(outcome);
        });
    }

    /// Reveal the correct answer after the countdown ran out.
    ///
    /// An unanswered question stays unanswered: nothing is selected on the
    /// learner's behalf.
    fn handle_timer_expired(&mut self) {
        let Some(question_id) = self.state.current_question().map(Question::id) else {
            return;
        };
        if self.state.selected_option.is_some() {
            self.update(|s| s.show_feedback_dialog = true);
            return;
        }
        self.update(|s| {
            if !s.show_feedback {
                s.outcomes.push(QuestionOutcome::unanswered(question_id));
            }
            s.show_feedback = true;
            s.timer_expired = true;
            s.show_feedback_dialog = true;
        });
    }

    fn expire_timer(&mut self) {
        self.timer = None;
        self.timer_generation += 1;
        self.update(|s| {
            s.timer_progress = 0.0;
            s.is_timer_running = false;
            s.timer_expired = true;
        });
        self.handle_timer_expired();
    }

    fn update_timer_progress(&mut self, progress: f32) {
        if progress.is_nan() || progress <= 0.0 {
            return;
        }
        let progress = progress.min(1.0);
        self.update(|s| {
            if progress <= s.timer_progress {
                s.timer_progress = progress;
            }
        });
    }

    fn show_feedback_dialog(&mut self) {
        if self.state.show_feedback && self.state.current_question().is_some() {
            self.update(|s| s.show_feedback_dialog = true);
        }
    }

    fn hide_feedback_dialog(&mut self) {
        self.update(|s| s.show_feedback_dialog = false);
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle(self: &Arc<Self>, core: &mut Core, event: QuizEvent) {
        match event {
            QuizEvent::LoadQuestions => self.load_questions(core),
            QuizEvent::SelectDifficulty(difficulty) => self.select_difficulty(core, difficulty),
            QuizEvent::SelectAnswer(option) => core.select_answer(option),
            QuizEvent::NextQuestion => self.next_question(core),
            QuizEvent::RestartQuiz => self.restart_quiz(core),
            QuizEvent::StartTimer => {
                if !core.state.show_feedback {
                    self.start_timer(core);
                }
            }
            QuizEvent::PauseTimer => core.pause_timer(),
            QuizEvent::ResumeTimer => self.resume_timer(core),
            QuizEvent::UpdateTimerProgress(progress) => core.update_timer_progress(progress),
            QuizEvent::TimerExpired => {
                if core.state.current_question().is_some() && core.state.selected_option.is_none() {
                    core.cancel_timer();
                    core.expire_timer();
                } else {
                    core.handle_timer_expired();
                }
            }
            QuizEvent::ShowFeedbackDialog => core.show_feedback_dialog(),
            QuizEvent::HideFeedbackDialog => core.hide_feedback_dialog(),
        }
    }

    fn load_questions(self: &Arc<Self>, core: &mut Core) {
        core.cancel_timer();
        core.abort_fetch();
        let generation = core.load_generation;
        let difficulty = core.state.selected_difficulty;
        core.update(|s| {
            s.is_timer_running = false;
            s.is_loading = true;
            s.error = None;
        });
        info!(%difficulty, generation, "loading questions");

        let provider = Arc::clone(&self.provider);
        let weak = Arc::downgrade(self);
        core.fetch = Some(self.runtime.spawn(async move {
            let result = provider.fetch(difficulty).await;
            if let Some(shared) = weak.upgrade() {
                shared.finish_load(generation, result);
            }
        }));
    }

    fn finish_load(self: &Arc<Self>, generation: u64, result: Result<Vec<Question>, ProviderError>) {
        let mut core = self.lock();
        if core.closed || generation != core.load_generation {
            debug!(generation, "discarding superseded question batch");
            return;
        }
        core.fetch = None;

        match result {
            Ok(questions) => {
                info!(count = questions.len(), "questions loaded");
                let started_at = self.clock.now();
                self.start_timer_with(&mut core, |s| {
                    s.questions = questions.into();
                    s.current_index = 0;
                    s.selected_option = None;
                    s.show_feedback = false;
                    s.show_feedback_dialog = false;
                    s.is_loading = false;
                    s.outcomes.clear();
                    s.started_at = Some(started_at);
                });
            }
            Err(err) => {
                warn!(error = %err, "question fetch failed");
                let message = err.to_string();
                let message = if message.trim().is_empty() {
                    FALLBACK_LOAD_ERROR.to_string()
                } else {
                    message
                };
                core.update(|s| {
                    s.is_loading = false;
                    s.error = Some(message);
                });
            }
        }
    }

    fn select_difficulty(self: &Arc<Self>, core: &mut Core, difficulty: Difficulty) {
        if core.state.selected_difficulty == difficulty {
            return;
        }
        core.cancel_timer();
        core.update(|s| {
            s.selected_difficulty = difficulty;
            s.is_timer_running = false;
            s.is_loading = true;
            s.error = None;
        });
        self.load_questions(core);
    }

    fn next_question(self: &Arc<Self>, core: &mut Core) {
        core.hide_feedback_dialog();
        if core.state.current_index + 1 < core.state.questions.len() {
            self.start_timer_with(core, |s| {
                s.current_index += 1;
                s.selected_option = None;
                s.show_feedback = false;
            });
        }
    }

    fn restart_quiz(self: &Arc<Self>, core: &mut Core) {
        let started_at = self.clock.now();
        self.start_timer_with(core, |s| {
            s.current_index = 0;
            s.selected_option = None;
            s.show_feedback = false;
            s.show_feedback_dialog = false;
            s.outcomes.clear();
            s.started_at = Some(started_at);
        });
    }

    /// Start a fresh countdown for the current question.
    fn start_timer(self: &Arc<Self>, core: &mut Core) {
        self.start_timer_with(core, |_| {});
    }

    /// Apply `reset` and start a fresh countdown as one transition. With no
    /// current question afterwards the timer stays stopped.
    fn start_timer_with(self: &Arc<Self>, core: &mut Core, reset: impl FnOnce(&mut SessionState)) {
        core.cancel_timer();
        let mut running = false;
        core.update(|s| {
            reset(s);
            running = s.current_question().is_some();
            s.timer_progress = 1.0;
            s.is_timer_running = running;
            s.timer_expired = false;
        });
        if running {
            let total = core.state.question_duration();
            self.run_countdown(core, Countdown::start(total));
        }
    }

    fn resume_timer(self: &Arc<Self>, core: &mut Core) {
        let state = &core.state;
        if state.timer_expired
            || state.is_timer_running
            || state.show_feedback
            || state.current_question().is_none()
        {
            return;
        }
        let total = state.question_duration();
        let remaining = state.remaining_time();
        core.cancel_timer();
        core.update(|s| s.is_timer_running = true);
        self.run_countdown(core, Countdown::resume(total, remaining));
    }

    fn run_countdown(self: &Arc<Self>, core: &mut Core, countdown: Countdown) {
        let generation = core.timer_generation;
        let weak = Arc::downgrade(self);
        core.timer = Some(spawn_countdown(
            &self.runtime,
            generation,
            countdown,
            self.tick_interval,
            move |generation, tick| match weak.upgrade() {
                Some(shared) => shared.apply_tick(generation, tick),
                None => ControlFlow::Break(()),
            },
        ));
    }

    fn apply_tick(&self, generation: u64, tick: Tick) -> ControlFlow<()> {
        let mut core = self.lock();
        if core.closed || generation != core.timer_generation {
            return ControlFlow::Break(());
        }
        match tick {
            Tick::Running(progress) => {
                core.update(|s| s.timer_progress = progress.min(s.timer_progress));
                ControlFlow::Continue(())
            }
            Tick::Expired => {
                debug!(generation, "question timer expired");
                core.expire_timer();
                ControlFlow::Break(())
            }
        }
    }
}

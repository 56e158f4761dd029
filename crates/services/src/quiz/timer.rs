use std::ops::ControlFlow;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// What a countdown reports on each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Remaining share of the full budget, strictly above zero.
    Running(f32),
    Expired,
}

/// One run of a question countdown.
///
/// `remaining` is what was left when the run started; it equals `total` for a
/// fresh question and less after a resume.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    total: Duration,
    remaining: Duration,
    started_at: Instant,
}

impl Countdown {
    #[must_use]
    pub fn start(total: Duration) -> Self {
        Self::resume(total, total)
    }

    #[must_use]
    pub fn resume(total: Duration, remaining: Duration) -> Self {
        Self {
            total,
            remaining: remaining.min(total),
            started_at: Instant::now(),
        }
    }

    /// Evaluate the countdown at `now`.
    ///
    /// A `now` earlier than the start, or a zero budget, counts as expired.
    #[must_use]
    pub fn tick_at(&self, now: Instant) -> Tick {
        let Some(elapsed) = now.checked_duration_since(self.started_at) else {
            return Tick::Expired;
        };
        if self.total.is_zero() || elapsed >= self.remaining {
            return Tick::Expired;
        }
        let left = self.remaining - elapsed;
        let progress = (left.as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0) as f32;
        Tick::Running(progress.max(f32::MIN_POSITIVE))
    }
}

/// Handle to a spawned countdown task.
///
/// Dropping the handle detaches the task; call `cancel` to stop it.
#[derive(Debug)]
pub struct TimerHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl TimerHandle {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        self.task.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a periodic task that feeds `on_tick` until it returns `Break` or the
/// countdown expires.
///
/// `on_tick` receives the generation the timer was started with so the owner
/// can drop ticks from a superseded run.
pub fn spawn_countdown<F>(
    runtime: &Handle,
    generation: u64,
    countdown: Countdown,
    interval: Duration,
    mut on_tick: F,
) -> TimerHandle
where
    F: FnMut(u64, Tick) -> ControlFlow<()> + Send + 'static,
{
    let interval = interval.max(Duration::from_millis(1));
    let task = runtime.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let tick = countdown.tick_at(Instant::now());
            if on_tick(generation, tick).is_break() || tick == Tick::Expired {
                break;
            }
        }
    });
    TimerHandle { generation, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test(start_paused = true)]
    async fn countdown_decays_then_expires() {
        let countdown = Countdown::start(Duration::from_secs(10));
        let start = Instant::now();

        assert_eq!(countdown.tick_at(start), Tick::Running(1.0));
        assert_eq!(
            countdown.tick_at(start + Duration::from_secs(5)),
            Tick::Running(0.5)
        );
        assert_eq!(countdown.tick_at(start + Duration::from_secs(10)), Tick::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn resumed_countdown_keeps_its_share() {
        let countdown = Countdown::resume(Duration::from_secs(20), Duration::from_secs(5));
        let start = Instant::now();
        assert_eq!(countdown.tick_at(start), Tick::Running(0.25));
        assert_eq!(countdown.tick_at(start + Duration::from_secs(5)), Tick::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_budget_expires_immediately() {
        let countdown = Countdown::start(Duration::ZERO);
        assert_eq!(countdown.tick_at(Instant::now()), Tick::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn running_progress_never_hits_zero() {
        let countdown = Countdown::start(Duration::from_secs(30));
        let almost = Instant::now() + Duration::from_secs(30) - Duration::from_nanos(1);
        match countdown.tick_at(almost) {
            Tick::Running(progress) => assert!(progress > 0.0),
            Tick::Expired => panic!("expired early"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_countdown_ticks_until_expiry() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handle = spawn_countdown(
            &Handle::current(),
            7,
            Countdown::start(Duration::from_millis(300)),
            TICK_INTERVAL,
            move |generation, tick| {
                assert_eq!(generation, 7);
                sink.lock().unwrap().push(tick);
                ControlFlow::Continue(())
            },
        );
        assert_eq!(handle.generation(), 7);

        tokio::time::sleep(Duration::from_secs(1)).await;
        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.first(), Some(&Tick::Running(1.0)));
        assert_eq!(seen.last(), Some(&Tick::Expired));
        assert_eq!(seen.iter().filter(|t| **t == Tick::Expired).count(), 1);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_countdown_stops_ticking() {
        let count = Arc::new(Mutex::new(0_u32));
        let sink = Arc::clone(&count);
        let handle = spawn_countdown(
            &Handle::current(),
            1,
            Countdown::start(Duration::from_secs(30)),
            TICK_INTERVAL,
            move |_, _| {
                *sink.lock().unwrap() += 1;
                ControlFlow::Continue(())
            },
        );

        tokio::time::sleep(Duration::from_millis(250)).await;
        handle.cancel();
        let before = *count.lock().unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(*count.lock().unwrap(), before);
    }
}

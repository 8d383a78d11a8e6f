//! Driving a countdown from the Tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use flagquiz_protocol::Timer;
use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{trace, warn};

use crate::{Clock, TimerPurpose, WallClockCountdown};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for spawned countdown tasks.
#[derive(Debug, Clone)]
pub struct CountdownConfig {
    /// How often the display value is recomputed. Default: 100 ms.
    ///
    /// This only controls display freshness. Deadlines come from the
    /// wall clock, so a longer interval never delays `TimeUp` by more
    /// than one interval.
    pub tick_interval: Duration,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
        }
    }
}

impl CountdownConfig {
    /// Shortest allowed tick interval.
    pub const MIN_TICK: Duration = Duration::from_millis(10);
    /// Longest allowed tick interval.
    pub const MAX_TICK: Duration = Duration::from_secs(1);

    /// Clamps out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.tick_interval < Self::MIN_TICK || self.tick_interval > Self::MAX_TICK {
            warn!(
                tick_ms = self.tick_interval.as_millis() as u64,
                "countdown tick interval out of range, clamping"
            );
            self.tick_interval = self.tick_interval.clamp(Self::MIN_TICK, Self::MAX_TICK);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Events and handles
// ---------------------------------------------------------------------------

/// Emitted by a countdown task when its deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownEvent {
    /// Which countdown finished.
    pub purpose: TimerPurpose,
    /// Installation number, used to discard events from superseded timers.
    pub generation: u64,
}

/// Owner's handle to a running countdown task.
///
/// Dropping the handle aborts the task.
#[derive(Debug)]
pub struct CountdownHandle {
    purpose: TimerPurpose,
    generation: u64,
    timer: Timer,
    remaining: watch::Receiver<u32>,
    visibility: Arc<Notify>,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// Which countdown this is.
    pub fn purpose(&self) -> TimerPurpose {
        self.purpose
    }

    /// Installation number.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The timer this countdown follows.
    pub fn timer(&self) -> Timer {
        self.timer
    }

    /// Last published whole seconds remaining.
    pub fn remaining_secs(&self) -> u32 {
        *self.remaining.borrow()
    }

    /// A receiver that observes every display update.
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }

    /// Asks the task to recompute right away.
    pub fn visibility_regained(&self) {
        self.visibility.notify_one();
    }

    /// Whether the task has ended (fired or aborted).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the task. No event is sent after this returns.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a task that follows `timer` and sends one [`CountdownEvent`]
/// when it runs out.
///
/// Must be called from inside a Tokio runtime.
pub fn spawn_countdown<C: Clock + Clone>(
    purpose: TimerPurpose,
    generation: u64,
    timer: Timer,
    clock: C,
    config: &CountdownConfig,
    events: mpsc::UnboundedSender<CountdownEvent>,
) -> CountdownHandle {
    let mut countdown = WallClockCountdown::new(clock, timer.duration);
    countdown.activate(Some(timer.start_time));

    let (remaining_tx, remaining_rx) = watch::channel(countdown.remaining_secs());
    let visibility = Arc::new(Notify::new());
    let wake = Arc::clone(&visibility);
    let tick_interval = config.tick_interval;

    let task = tokio::spawn(async move {
        let mut interval = time::interval(tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = wake.notified() => {
                    countdown.on_visibility_regained();
                }
            }

            let tick = countdown.poll();
            remaining_tx.send_replace(tick.remaining_ms.div_ceil(1000) as u32);

            if tick.fired {
                trace!(%purpose, generation, "countdown task finished");
                let _ = events.send(CountdownEvent { purpose, generation });
                break;
            }
        }
    });

    CountdownHandle {
        purpose,
        generation,
        timer,
        remaining: remaining_rx,
        visibility,
        task,
    }
}

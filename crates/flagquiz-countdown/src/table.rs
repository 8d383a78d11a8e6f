//! One countdown per logical purpose, with explicit cancellation.
//!
//! Phase transitions supersede whatever countdown was running: a new
//! question replaces the previous question's timer, a stop cancels
//! everything. The table makes that bookkeeping explicit instead of
//! relying on handles being dropped at the right moment, and it stamps
//! every installation with a generation so an event already queued by a
//! superseded timer can be recognised and ignored.

use std::collections::HashMap;
use std::fmt;

use flagquiz_protocol::Timer;
use tokio::sync::mpsc;
use tracing::debug;

use crate::{Clock, CountdownConfig, CountdownEvent, CountdownHandle, spawn_countdown};

/// What a countdown is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerPurpose {
    /// Lead-in before the first question.
    StartingCountdown,
    /// Time left to answer the current question.
    QuestionCountdown,
    /// Pause on the results screen before the next question.
    ResultsCountdown,
}

impl fmt::Display for TimerPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartingCountdown => "starting-countdown",
            Self::QuestionCountdown => "question-countdown",
            Self::ResultsCountdown => "results-countdown",
        };
        f.write_str(name)
    }
}

/// Running countdowns keyed by purpose.
pub struct TimerTable<C: Clock + Clone> {
    clock: C,
    config: CountdownConfig,
    events: mpsc::UnboundedSender<CountdownEvent>,
    entries: HashMap<TimerPurpose, CountdownHandle>,
    next_generation: u64,
}

impl<C: Clock + Clone> TimerTable<C> {
    /// Creates an empty table and the receiver for its time-up events.
    pub fn new(
        clock: C,
        config: CountdownConfig,
    ) -> (Self, mpsc::UnboundedReceiver<CountdownEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let table = Self {
            clock,
            config: config.validated(),
            events: tx,
            entries: HashMap::new(),
            next_generation: 1,
        };
        (table, rx)
    }

    /// Starts a countdown for `purpose`, cancelling any previous one
    /// with the same purpose. Returns the new generation.
    pub fn install(&mut self, purpose: TimerPurpose, timer: Timer) -> u64 {
        self.cancel(purpose);

        let generation = self.next_generation;
        self.next_generation += 1;

        let handle = spawn_countdown(
            purpose,
            generation,
            timer,
            self.clock.clone(),
            &self.config,
            self.events.clone(),
        );
        debug!(
            %purpose,
            generation,
            duration = timer.duration,
            start_time = timer.start_time,
            "countdown installed"
        );
        self.entries.insert(purpose, handle);
        generation
    }

    /// Cancels the countdown for `purpose`. Returns `true` if one was running.
    pub fn cancel(&mut self, purpose: TimerPurpose) -> bool {
        match self.entries.remove(&purpose) {
            Some(handle) => {
                handle.abort();
                debug!(%purpose, generation = handle.generation(), "countdown cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancels every countdown.
    pub fn cancel_all(&mut self) {
        for (purpose, handle) in self.entries.drain() {
            handle.abort();
            debug!(%purpose, generation = handle.generation(), "countdown cancelled");
        }
    }

    /// Whether a countdown for `purpose` is installed.
    pub fn is_running(&self, purpose: TimerPurpose) -> bool {
        self.entries.contains_key(&purpose)
    }

    /// Whole seconds left on the countdown for `purpose`.
    pub fn remaining_secs(&self, purpose: TimerPurpose) -> Option<u32> {
        self.entries.get(&purpose).map(CountdownHandle::remaining_secs)
    }

    /// Handle for `purpose`, e.g. to subscribe to display updates.
    pub fn get(&self, purpose: TimerPurpose) -> Option<&CountdownHandle> {
        self.entries.get(&purpose)
    }

    /// Forces every running countdown to recompute now.
    pub fn visibility_regained(&self) {
        for handle in self.entries.values() {
            handle.visibility_regained();
        }
    }

    /// Accepts a time-up event if it comes from the current installation
    /// for its purpose, removing that entry. Stale events return `false`.
    pub fn accept(&mut self, event: &CountdownEvent) -> bool {
        let current = self
            .entries
            .get(&event.purpose)
            .is_some_and(|h| h.generation() == event.generation);
        if current {
            self.entries.remove(&event.purpose);
        } else {
            debug!(
                purpose = %event.purpose,
                generation = event.generation,
                "ignoring time-up from superseded countdown"
            );
        }
        current
    }

    /// Number of installed countdowns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

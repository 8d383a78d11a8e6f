//! The wall-clock countdown itself, free of any runtime.
//!
//! Remaining time is never accumulated from ticks. Every read computes
//! `end_time - now` against an absolute deadline, so a late timer
//! callback or a suspended browser tab cannot make the display drift.

use std::time::Duration;

use tracing::{debug, trace};

use crate::Clock;

/// Result of one [`WallClockCountdown::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Milliseconds until the deadline, clamped at zero.
    pub remaining_ms: u64,
    /// `true` exactly once per activation: on the first poll that
    /// observes the deadline.
    pub fired: bool,
}

/// A fixed-duration countdown anchored to an absolute end time.
///
/// ## Activation semantics
///
/// - [`activate(Some(start))`](Self::activate) anchors to an external
///   start time (server-supplied, shared by every client in the room).
/// - [`activate(None)`](Self::activate) anchors to `now()`.
/// - [`deactivate`](Self::deactivate) freezes the display at the full
///   duration and never fires.
///
/// Re-activating after a deactivation without passing the old anchor
/// starts the full duration again; passing the old anchor resumes
/// against the original deadline.
#[derive(Debug)]
pub struct WallClockCountdown<C: Clock> {
    clock: C,
    duration_ms: u64,
    /// Anchor in epoch milliseconds. `None` while inactive.
    start_time: Option<u64>,
    fired: bool,
}

impl<C: Clock> WallClockCountdown<C> {
    /// Creates an inactive countdown of `duration_secs`.
    pub fn new(clock: C, duration_secs: u32) -> Self {
        Self {
            clock,
            duration_ms: u64::from(duration_secs) * 1000,
            start_time: None,
            fired: false,
        }
    }

    /// Starts counting down from `start_time`, or from now if `None`.
    pub fn activate(&mut self, start_time: Option<u64>) {
        let anchor = start_time.unwrap_or_else(|| self.clock.now_ms());
        self.start_time = Some(anchor);
        self.fired = false;
        debug!(
            start_time = anchor,
            duration_ms = self.duration_ms,
            external = start_time.is_some(),
            "countdown activated"
        );
    }

    /// Stops the countdown. The display returns to the full duration.
    pub fn deactivate(&mut self) {
        if self.start_time.take().is_some() {
            debug!("countdown deactivated");
        }
        self.fired = false;
    }

    /// Re-anchors to now, optionally with a new duration.
    pub fn restart(&mut self, next_duration_secs: Option<u32>) {
        if let Some(secs) = next_duration_secs {
            self.duration_ms = u64::from(secs) * 1000;
        }
        self.activate(None);
    }

    /// Whether the countdown is running.
    pub fn is_active(&self) -> bool {
        self.start_time.is_some()
    }

    /// The configured duration.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Absolute deadline in epoch milliseconds, if active.
    pub fn end_time(&self) -> Option<u64> {
        self.start_time.map(|start| start.saturating_add(self.duration_ms))
    }

    /// Time left until the deadline. The full duration while inactive.
    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_ms())
    }

    /// Whole seconds left, rounded up, for display.
    pub fn remaining_secs(&self) -> u32 {
        u32::try_from(self.remaining_ms().div_ceil(1000)).unwrap_or(u32::MAX)
    }

    fn remaining_ms(&self) -> u64 {
        match self.end_time() {
            Some(end) => end.saturating_sub(self.clock.now_ms()),
            None => self.duration_ms,
        }
    }

    /// Recomputes the remaining time and reports whether the deadline
    /// was reached for the first time since activation.
    pub fn poll(&mut self) -> Tick {
        let remaining_ms = self.remaining_ms();
        let fired = self.is_active() && remaining_ms == 0 && !self.fired;
        if fired {
            self.fired = true;
            debug!("countdown reached zero");
        }
        trace!(remaining_ms, fired, "countdown polled");
        Tick { remaining_ms, fired }
    }

    /// Handles a page becoming visible again.
    ///
    /// Recomputes immediately instead of waiting for the next tick, so a
    /// backgrounded client never shows stale time.
    pub fn on_visibility_regained(&mut self) -> Tick {
        trace!("visibility regained, recomputing countdown");
        self.poll()
    }
}

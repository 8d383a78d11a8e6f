//! Exponential reconnection backoff.

use std::time::Duration;

/// Counts reconnection attempts and spaces them out.
///
/// The delay before attempt `n` is `min(base * 2^(n-1), max)`.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    max_attempts: u32,
    attempts: u32,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            max,
            max_attempts,
            attempts: 0,
        }
    }

    /// Delay before attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(31);
        self.base
            .checked_mul(1u32 << shift)
            .map_or(self.max, |d| d.min(self.max))
    }

    /// Claims the next attempt. Returns its number and delay, or `None`
    /// once every attempt has been used.
    pub fn next_attempt(&mut self) -> Option<(u32, Duration)> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some((self.attempts, self.delay_for(self.attempts)))
    }

    /// Attempts claimed since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Starts counting from zero again.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backoff() -> Backoff {
        Backoff::new(Duration::from_millis(500), Duration::from_secs(3), 3)
    }

    #[test]
    fn test_delays_double() {
        let b = backoff();
        assert_eq!(b.delay_for(1), Duration::from_millis(500));
        assert_eq!(b.delay_for(2), Duration::from_millis(1000));
        assert_eq!(b.delay_for(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let b = backoff();
        assert_eq!(b.delay_for(4), Duration::from_secs(3));
        assert_eq!(b.delay_for(40), Duration::from_secs(3));
    }

    #[test]
    fn test_attempts_run_out() {
        let mut b = backoff();
        assert_eq!(b.next_attempt(), Some((1, Duration::from_millis(500))));
        assert_eq!(b.next_attempt(), Some((2, Duration::from_millis(1000))));
        assert_eq!(b.next_attempt(), Some((3, Duration::from_millis(2000))));
        assert_eq!(b.next_attempt(), None);
        assert_eq!(b.attempts(), 3);
    }

    #[test]
    fn test_reset() {
        let mut b = backoff();
        b.next_attempt();
        b.next_attempt();
        b.reset();
        assert_eq!(b.next_attempt(), Some((1, Duration::from_millis(500))));
    }
}

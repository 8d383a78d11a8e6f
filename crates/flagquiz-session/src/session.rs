//! Connection states and configuration.

use std::fmt;
use std::time::Duration;

use tracing::warn;

// ---------------------------------------------------------------------------
// ConnectionConfig
// ---------------------------------------------------------------------------

/// Configuration for the connection manager.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server URL, e.g. `wss://quiz.example.com/ws`.
    pub url: String,

    /// Delay before the first reconnection attempt. Default: 1 s.
    pub base_delay: Duration,

    /// Upper bound for any single delay. Default: 10 s.
    pub max_delay: Duration,

    /// Failed attempts tolerated before giving up. Default: 3.
    pub max_reconnect_attempts: u32,

    /// Capacity of the command channel. Default: 64.
    pub command_buffer: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:3001/ws".into(),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_reconnect_attempts: 3,
            command_buffer: 64,
        }
    }
}

impl ConnectionConfig {
    /// Creates a config for `url` with default timings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Fixes values that would stall or spin the manager.
    pub fn validated(mut self) -> Self {
        if self.base_delay.is_zero() {
            warn!("reconnect base delay is zero, using 1 ms");
            self.base_delay = Duration::from_millis(1);
        }
        if self.max_delay < self.base_delay {
            warn!(
                base_ms = self.base_delay.as_millis() as u64,
                max_ms = self.max_delay.as_millis() as u64,
                "reconnect max delay below base delay, raising it"
            );
            self.max_delay = self.base_delay;
        }
        if self.command_buffer == 0 {
            self.command_buffer = 1;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// Where the connection is in its lifecycle.
///
/// ```text
/// Disconnected ──connect──→ Connecting ──open──→ Connected
///      ↑                        │  ↑                 │
///      │                  fail  │  └── backoff ──┐   │ abnormal close
///      │                        ▼                │   ▼
///      └──── attempts used up ── Reconnecting ───┘
/// ```
///
/// A close with code 1000 (clean) or 4000 (superseded) goes straight
/// back to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Waiting to make reconnection attempt `attempt` (1-based).
    Reconnecting { attempt: u32 },
}

impl ConnectionState {
    /// Returns `true` if frames can be written.
    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("disconnected"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connected"),
            Self::Reconnecting { attempt } => write!(f, "reconnecting ({attempt})"),
        }
    }
}

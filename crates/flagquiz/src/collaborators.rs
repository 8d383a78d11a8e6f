//! What the client needs from its host application.
//!
//! The client never draws anything, plays audio or reads preferences on
//! its own. It reaches out through these three traits, injected at
//! build time. The defaults log, stay silent and return fixed settings,
//! which is enough for headless use and tests.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// A short sound played on a game moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    GameStart,
    NewQuestion,
    Correct,
    Incorrect,
    GameOver,
}

/// Shows messages to the user (toasts, status lines).
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, level: Level, message: &str);
}

/// Plays sound cues.
pub trait AudioCues: Send + Sync + 'static {
    fn play_cue(&self, cue: Cue);
}

/// Read-only access to user preferences.
pub trait SettingsReader: Send + Sync + 'static {
    fn sound_effects_enabled(&self) -> bool;
}

impl<T: Notifier> Notifier for Arc<T> {
    fn notify(&self, level: Level, message: &str) {
        (**self).notify(level, message);
    }
}

impl<T: AudioCues> AudioCues for Arc<T> {
    fn play_cue(&self, cue: Cue) {
        (**self).play_cue(cue);
    }
}

impl<T: SettingsReader> SettingsReader for Arc<T> {
    fn sound_effects_enabled(&self) -> bool {
        (**self).sound_effects_enabled()
    }
}

/// Writes notifications to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: Level, message: &str) {
        match level {
            Level::Info | Level::Success => info!(%level, "{message}"),
            Level::Warning => warn!(%level, "{message}"),
            Level::Error => error!(%level, "{message}"),
        }
    }
}

/// Plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioCues for SilentAudio {
    fn play_cue(&self, _cue: Cue) {}
}

/// Fixed preferences.
#[derive(Debug, Clone, Copy)]
pub struct StaticSettings {
    pub sound_effects: bool,
}

impl Default for StaticSettings {
    fn default() -> Self {
        Self {
            sound_effects: true,
        }
    }
}

impl SettingsReader for StaticSettings {
    fn sound_effects_enabled(&self) -> bool {
        self.sound_effects
    }
}

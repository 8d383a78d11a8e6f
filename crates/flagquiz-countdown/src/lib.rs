//! Wall-clock countdowns for Flagquiz.
//!
//! Question and results countdowns must agree across every client in a
//! room, survive late timer callbacks, and never fire against a phase
//! that has already moved on. This crate provides:
//!
//! - [`WallClockCountdown`]: pure remaining-time arithmetic against an
//!   absolute deadline, no runtime required.
//! - [`spawn_countdown`] / [`CountdownHandle`]: a Tokio task that keeps
//!   the display fresh and reports time-up once.
//! - [`TimerTable`]: one countdown per [`TimerPurpose`], with explicit
//!   cancellation on phase transitions.
//!
//! # Integration
//!
//! The client event loop owns a table and selects on its event receiver
//! next to the connection events:
//!
//! ```ignore
//! let (mut timers, mut timer_events) = TimerTable::new(SystemClock, CountdownConfig::default());
//! loop {
//!     tokio::select! {
//!         Some(event) = connection_events.recv() => { /* reduce, maybe install timers */ }
//!         Some(done) = timer_events.recv() => {
//!             if timers.accept(&done) { /* time is up for done.purpose */ }
//!         }
//!     }
//! }
//! ```

mod clock;
mod countdown;
mod table;
mod task;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{Tick, WallClockCountdown};
pub use table::{TimerPurpose, TimerTable};
pub use task::{CountdownConfig, CountdownEvent, CountdownHandle, spawn_countdown};

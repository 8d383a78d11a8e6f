//! Session state and the game phase reducer for Flagquiz.
//!
//! Everything the client knows about its room lives in a [`Session`].
//! Server events are decoded into [`GameEvent`]s and folded in with
//! [`reduce`]; local actions go through [`submit_answer`] and
//! [`leave_room`]. None of these touch the network or the clock, so the
//! whole game flow can be tested with plain values.
//!
//! # Key types
//!
//! - [`Session`]: current user and room
//! - [`GameEvent`]: one decoded server event
//! - [`Transition`]: the phase before and after a reduction
//! - [`phase`]: which phase changes are expected

mod error;
mod event;
pub mod phase;
mod reducer;
mod session;

pub use error::ReduceError;
pub use event::{GameEvent, Transition};
pub use reducer::{leave_room, reduce, submit_answer};
pub use session::Session;

//! Connection management for Flagquiz.
//!
//! This crate owns the single connection to the quiz server:
//!
//! 1. **Lifecycle**: connect, disconnect, and the observable
//!    [`ConnectionState`] machine
//! 2. **Reconnection**: exponential [`Backoff`] after abnormal closes,
//!    giving up after a bounded number of attempts
//! 3. **Sending**: fire-and-forget writes that are dropped, and reported
//!    once, while the connection is down
//!
//! # How it fits in the stack
//!
//! ```text
//! Client (above)  ← reacts to ConnectionEvents, calls send()
//!     ↕
//! Session Layer (this crate)  ← owns the socket, applies close-code policy
//!     ↕
//! Transport Layer (below)  ← Connector / Connection traits
//! ```

mod backoff;
mod error;
mod manager;
mod session;

pub use backoff::Backoff;
pub use error::ConnectionError;
pub use manager::{ConnectionEvent, ConnectionManager};
pub use session::{ConnectionConfig, ConnectionState};

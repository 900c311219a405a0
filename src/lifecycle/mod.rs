//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → every subscribed server drains and exits
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl+C) → graceful shutdown
//! ```
//!
//! Detached metric sends are not tracked; a send still in flight when the
//! runtime stops is dropped.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;

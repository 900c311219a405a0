//! Observability subsystem.
//!
//! Every component logs through `tracing`; the binary installs the
//! subscriber. Metric send failures are logged only when the monitor's
//! `logging_enabled` flag is set.

pub mod logging;

pub use logging::init_logging;

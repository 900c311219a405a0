//! Tower middleware.

pub mod monitor;

pub use monitor::{MonitorLayer, MonitorService};

//! HTTP request monitoring middleware.
//!
//! Wraps request handlers, captures method, URI, host, status and latency of
//! each request and POSTs them as JSON to an external metrics collector.
//!
//! ```ignore
//! let monitor = Monitor::new(MonitorConfig::with_destination(Destination::Local))?;
//!
//! // tower / axum
//! let app = Router::new().route("/", get(index)).layer(monitor.layer());
//!
//! // writer-style handlers
//! let handler = monitor.wrap(my_handler);
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod monitor;
pub mod observability;

pub use config::{AppConfig, Delivery, Destination, MonitorConfig};
pub use error::{MetricError, MonitorError};
pub use http::{Handler, MonitorLayer, MonitoredWriter, RequestInfo, ResponseWriter};
pub use monitor::{MetricPayload, Monitor, EXPECTED_STATUS};

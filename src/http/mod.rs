//! HTTP surface of the monitor.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → request.rs (RequestInfo snapshot)
//!     → writer surface:  handler.rs Monitored<H> → writer.rs MonitoredWriter
//!       tower surface:   middleware/monitor.rs MonitorService<S>
//!     → first status write → Monitor::record
//!     → response to client (unchanged)
//! ```

pub mod handler;
pub mod middleware;
pub mod request;
pub mod server;
pub mod writer;

pub use handler::{handler_fn, Handler, HandlerFn, HandlerService, Monitored};
pub use middleware::{MonitorLayer, MonitorService};
pub use request::RequestInfo;
pub use server::DemoServer;
pub use writer::{BufferedWriter, MonitoredWriter, ResponseWriter, WriterState};

//! Metric delivery subsystem.
//!
//! # Data Flow
//! ```text
//! MonitoredWriter::write_header / MonitorService response
//!     → Monitor::record (enabled? latency?)
//!     → delivery mode
//!         Detached → tokio::spawn(send_metric)   (response continues)
//!         Blocking → send_metric.await           (response waits)
//!     → payload.rs (JSON body)
//!     → POST destination, expect 201 Created
//! ```
//!
//! # Design Decisions
//! - One shared `reqwest::Client` per monitor (connection pooling)
//! - Send failures never reach the monitored response
//! - Failures are logged only when `logging_enabled` is set

pub mod payload;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::{Host, Url};

use crate::config::validation::{validate_monitor, ValidationError};
use crate::config::{Delivery, MonitorConfig};
use crate::error::{MetricError, MonitorError};
use crate::http::handler::{Handler, Monitored};
use crate::http::middleware::MonitorLayer;
use crate::http::writer::{MonitoredWriter, ResponseWriter};
use crate::http::RequestInfo;

pub use payload::MetricPayload;

/// Status the collector answers with when it accepted a metric.
pub const EXPECTED_STATUS: StatusCode = StatusCode::CREATED;

/// Configured component issuing metric POSTs.
///
/// Cheap to clone; every clone shares the same config and connection pool.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<Inner>,
}

struct Inner {
    config: MonitorConfig,
    endpoint: Url,
    client: Client,
}

impl Monitor {
    /// Validate `config` and build the HTTP client.
    pub fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        validate_monitor(&config).map_err(MonitorError::InvalidConfig)?;
        let endpoint = config.destination.url().map_err(|e| {
            MonitorError::InvalidConfig(vec![ValidationError::new(
                "monitor.destination",
                e.to_string(),
            )])
        })?;
        let mut builder = Client::builder();
        if is_loopback(&endpoint) {
            // Environment proxies never apply to a local collector.
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        tracing::debug!(
            destination = %endpoint,
            delivery = ?config.delivery,
            metrics_enabled = config.metrics_enabled,
            "Monitor created"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                endpoint,
                client,
            }),
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Resolved collector URL.
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Decorate a writer-style handler.
    pub fn wrap<H: Handler>(&self, handler: H) -> Monitored<H> {
        Monitored::new(self.clone(), handler)
    }

    /// Tower layer that monitors any `Service<Request<B>>`.
    pub fn layer(&self) -> MonitorLayer {
        MonitorLayer::new(self.clone())
    }

    /// Wrap `writer` for one request. The start time is taken now.
    pub fn writer<W: ResponseWriter>(&self, request: RequestInfo, writer: W) -> MonitoredWriter<W> {
        MonitoredWriter::new(self.clone(), request, writer)
    }

    /// POST one metric and wait for the collector's answer.
    pub async fn send_metric(
        &self,
        request: &RequestInfo,
        status: StatusCode,
        latency: Option<Duration>,
    ) -> Result<(), MetricError> {
        let body = serde_json::to_vec(&MetricPayload::new(request, status.as_u16(), latency))?;

        let mut builder = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.inner.config.token)
            .body(body);
        if let Some(timeout) = self.inner.config.timeout() {
            builder = builder.timeout(timeout);
        }

        let res = builder.send().await.map_err(MetricError::from_send)?;
        if res.status() != EXPECTED_STATUS {
            return Err(MetricError::UnexpectedStatus(res.status()));
        }
        Ok(())
    }

    /// Report the response head of one request.
    ///
    /// Returns once the metric is handed off: immediately for detached
    /// delivery, after the collector answered for blocking delivery.
    pub async fn record(&self, request: RequestInfo, status: StatusCode, started: Option<Instant>) {
        let config = &self.inner.config;
        if !config.metrics_enabled {
            return;
        }

        let latency = if config.track_latency {
            started.map(|t| t.elapsed())
        } else {
            None
        };

        match config.delivery {
            Delivery::Detached => {
                let monitor = self.clone();
                tokio::spawn(async move {
                    monitor.deliver(&request, status, latency).await;
                });
            }
            Delivery::Blocking => self.deliver(&request, status, latency).await,
        }
    }

    async fn deliver(&self, request: &RequestInfo, status: StatusCode, latency: Option<Duration>) {
        let result = self.send_metric(request, status, latency).await;
        if !self.inner.config.logging_enabled {
            return;
        }
        match result {
            Ok(()) => tracing::debug!(
                method = %request.method,
                uri = %request.uri,
                status = status.as_u16(),
                "Metric sent"
            ),
            Err(e) => tracing::warn!(
                method = %request.method,
                uri = %request.uri,
                status = status.as_u16(),
                error = %e,
                "failed to send metric"
            ),
        }
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("delivery", &self.inner.config.delivery)
            .field("metrics_enabled", &self.inner.config.metrics_enabled)
            .finish()
    }
}

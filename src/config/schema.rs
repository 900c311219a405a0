//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files. Every
//! section is defaulted, so an empty file is a valid configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Collector endpoint used when running everything on one machine.
pub const LOCAL_DESTINATION: &str = "http://localhost:8080/metrics/create";

/// Collector endpoint as seen from inside a container.
pub const DOCKER_DESTINATION: &str = "http://host.docker.internal:8080/metrics/create";

/// Hosted production collector.
pub const PRODUCTION_DESTINATION: &str = "https://xmonitor.clickpush.xyz/metrics/create";

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Demo server settings.
    pub server: ServerConfig,

    /// Metric delivery settings.
    pub monitor: MonitorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Demo server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// How the metric POST is scheduled relative to the monitored response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Spawn an untracked task; the response never waits on the collector.
    #[default]
    Detached,
    /// Await the POST before the status is forwarded to the client.
    Blocking,
}

/// Metric delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Send metrics at all. When false the monitor is a passthrough.
    pub metrics_enabled: bool,

    /// Collector endpoint, preset name or absolute URL.
    pub destination: Destination,

    /// Log failed sends. When false failures are swallowed silently.
    pub logging_enabled: bool,

    /// Static bearer token sent with every metric.
    pub token: String,

    /// Delivery mode.
    pub delivery: Delivery,

    /// Upper bound on a single send in milliseconds. 0 disables the bound.
    pub timeout_ms: u64,

    /// Include the handler latency in the payload.
    pub track_latency: bool,
}

impl MonitorConfig {
    /// Config pointing at `destination` with everything else defaulted.
    pub fn with_destination(destination: Destination) -> Self {
        Self {
            destination,
            ..Self::default()
        }
    }

    /// Per-send timeout, if bounded.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            destination: Destination::Local,
            logging_enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            token: "CHANGE_ME_IN_PRODUCTION".to_string(),
            delivery: Delivery::Detached,
            timeout_ms: 100,
            track_latency: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Where metrics are POSTed.
///
/// Deserializes from `"local"`, `"docker"`, `"production"` or an absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Destination {
    Local,
    Docker,
    Production,
    Custom(Url),
}

impl Destination {
    /// Resolve to the endpoint URL.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        match self {
            Destination::Custom(url) => Ok(url.clone()),
            preset => Url::parse(preset.preset_str()),
        }
    }

    fn preset_str(&self) -> &str {
        match self {
            Destination::Local => LOCAL_DESTINATION,
            Destination::Docker => DOCKER_DESTINATION,
            Destination::Production => PRODUCTION_DESTINATION,
            Destination::Custom(url) => url.as_str(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.preset_str())
    }
}

impl TryFrom<String> for Destination {
    type Error = url::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Destination::Local),
            "docker" => Ok(Destination::Docker),
            "production" | "prod" => Ok(Destination::Production),
            _ => Url::parse(value.trim()).map(Destination::Custom),
        }
    }
}

impl From<Destination> for String {
    fn from(value: Destination) -> Self {
        match value {
            Destination::Local => "local".to_string(),
            Destination::Docker => "docker".to_string(),
            Destination::Production => "production".to_string(),
            Destination::Custom(url) => url.to_string(),
        }
    }
}

impl From<Url> for Destination {
    fn from(url: Url) -> Self {
        Destination::Custom(url)
    }
}

//! Error types for metric delivery and monitor construction.

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ValidationError;

/// Why a single metric send failed.
///
/// None of these affect the monitored response; they are only ever logged.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("failed to marshal data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to create request: {0}")]
    BuildRequest(#[source] reqwest::Error),
    #[error("failed to send metric: timed out")]
    Timeout(#[source] reqwest::Error),
    #[error("failed to send metric: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("failed to send metric: collector answered {0}")]
    UnexpectedStatus(StatusCode),
}

impl MetricError {
    /// Classify a reqwest error raised while sending.
    pub(crate) fn from_send(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MetricError::Timeout(err)
        } else if err.is_builder() {
            MetricError::BuildRequest(err)
        } else {
            MetricError::Transport(err)
        }
    }
}

/// Why a [`Monitor`](crate::Monitor) could not be built.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid monitor config: {}", join(.0))]
    InvalidConfig(Vec<ValidationError>),
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

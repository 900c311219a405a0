//! Configuration validation.
//!
//! Serde handles the syntax; this module checks that the values make sense
//! together. Every problem is reported, not just the first one.

use std::fmt;

use axum::http::HeaderValue;

use crate::config::schema::{AppConfig, MonitorConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a full application config.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = monitor_errors(&config.monitor);

    if config.server.bind_address.trim().is_empty() {
        errors.push(ValidationError::new(
            "server.bind_address",
            "must not be empty",
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "server.request_timeout_secs",
            "must be greater than zero",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate only the monitor section.
pub fn validate_monitor(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let errors = monitor_errors(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn monitor_errors(config: &MonitorConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match config.destination.url() {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(ValidationError::new(
                "monitor.destination",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url) if url.host_str().is_none() => {
            errors.push(ValidationError::new("monitor.destination", "missing host"));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("monitor.destination", e.to_string())),
    }

    if config.token.trim().is_empty() {
        errors.push(ValidationError::new("monitor.token", "must not be empty"));
    } else if HeaderValue::from_str(&format!("Bearer {}", config.token)).is_err() {
        errors.push(ValidationError::new(
            "monitor.token",
            "not a valid Authorization header value",
        ));
    }

    errors
}

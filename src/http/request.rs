//! Request snapshot taken before the handler runs.
//!
//! # Responsibilities
//! - Capture method, request target and host of the inbound request
//! - Prefer the request target as the client sent it over a router-rewritten one
//!
//! # Design Decisions
//! - Only owned copies are kept so the body can move into the handler
//! - Host comes from the `Host` header, falling back to the URI authority

use axum::extract::OriginalUri;
use axum::http::{header::HOST, Method, Request};

/// The parts of a request that end up in a metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: Method,
    /// Request target as received, e.g. `/foo?bar=1`.
    pub uri: String,
    pub host: Option<String>,
}

impl RequestInfo {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        let uri = request
            .extensions()
            .get::<OriginalUri>()
            .map(|original| &original.0)
            .unwrap_or_else(|| request.uri());

        let host = request
            .headers()
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| uri.authority().map(|a| a.to_string()));

        Self {
            method: request.method().clone(),
            uri: uri.to_string(),
            host,
        }
    }
}

//! Wire format of a single metric.

use std::time::Duration;

use serde::Serialize;

use crate::http::RequestInfo;

/// JSON body POSTed to the collector.
///
/// ```text
/// {"request":{"method":"GET","uri":"/foo","host":"example.com"},
///  "response":{"status":404,"latency":"1.2ms"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricPayload {
    pub request: RequestMetric,
    pub response: ResponseMetric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestMetric {
    pub method: String,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseMetric {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<String>,
}

impl MetricPayload {
    pub fn new(request: &RequestInfo, status: u16, latency: Option<Duration>) -> Self {
        Self {
            request: RequestMetric {
                method: request.method.to_string(),
                uri: request.uri.clone(),
                host: request.host.clone(),
            },
            response: ResponseMetric {
                status,
                latency: latency.map(format_latency),
            },
        }
    }
}

/// Human readable duration, e.g. `1.5ms`, `250µs`, `2.000001s`.
pub fn format_latency(latency: Duration) -> String {
    format!("{latency:?}")
}

//! Monitoring middleware for tower services.
//!
//! The inner service yielding its response is the moment the status is
//! written, so each call reports exactly one metric, after the inner future
//! resolves and before the response is returned.

use std::task::{Context, Poll};
use std::time::Instant;

use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::http::RequestInfo;
use crate::monitor::Monitor;

/// Layer produced by [`Monitor::layer`].
#[derive(Clone, Debug)]
pub struct MonitorLayer {
    monitor: Monitor,
}

impl MonitorLayer {
    pub fn new(monitor: Monitor) -> Self {
        Self { monitor }
    }
}

impl<S> Layer<S> for MonitorLayer {
    type Service = MonitorService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MonitorService {
            inner,
            monitor: self.monitor.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MonitorService<S> {
    inner: S,
    monitor: Monitor,
}

impl<S, B, ResBody> Service<Request<B>> for MonitorService<S>
where
    S: Service<Request<B>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let info = RequestInfo::from_request(&request);
        let started = Instant::now();
        let monitor = self.monitor.clone();
        let future = self.inner.call(request);

        Box::pin(async move {
            let response = match future.await {
                Ok(response) => response,
                Err(e) => {
                    // No response head exists to report.
                    tracing::debug!(method = %info.method, uri = %info.uri, "inner service failed");
                    return Err(e);
                }
            };
            monitor
                .record(info, response.status(), Some(started))
                .await;
            Ok(response)
        })
    }
}

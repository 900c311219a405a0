//! Writer-style handlers and their adapters.
//!
//! [`Handler`] is the `serve(request, writer)` interface the monitor
//! decorates. [`Monitored`] is the decorated handler returned by
//! [`Monitor::wrap`](crate::Monitor::wrap); [`HandlerService`] mounts any
//! handler on a tower stack or an axum `Router`.
//!
//! Handlers get the request with its body still unread, so every answer,
//! including a rejected body, passes through the writer they were given.

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use tower::Service;

use crate::http::writer::{BufferedWriter, ResponseWriter};
use crate::http::RequestInfo;
use crate::monitor::Monitor;

/// Something that answers a request by writing into a [`ResponseWriter`].
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn serve(&self, request: Request<Body>, writer: &mut dyn ResponseWriter);
}

/// Largest body [`read_body`] accepts.
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Buffer a request body up to [`BODY_LIMIT`].
///
/// On failure the writer is answered with 413 and `None` is returned.
pub async fn read_body(body: Body, writer: &mut dyn ResponseWriter) -> Option<Bytes> {
    match axum::body::to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::debug!(error = %e, "request body rejected");
            writer.write_header(StatusCode::PAYLOAD_TOO_LARGE).await;
            None
        }
    }
}

/// Handler built from a closure, see [`handler_fn`].
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

/// Build a [`Handler`] from a closure returning a boxed future.
///
/// ```ignore
/// let hello = handler_fn(|_req, w| Box::pin(async move {
///     let _ = w.write(b"hello").await;
/// }));
/// ```
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: for<'a> Fn(Request<Body>, &'a mut dyn ResponseWriter) -> BoxFuture<'a, ()>
        + Send
        + Sync
        + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'a> Fn(Request<Body>, &'a mut dyn ResponseWriter) -> BoxFuture<'a, ()>
        + Send
        + Sync
        + 'static,
{
    async fn serve(&self, request: Request<Body>, writer: &mut dyn ResponseWriter) {
        (self.f)(request, writer).await
    }
}

/// A handler decorated with a [`Monitor`].
pub struct Monitored<H> {
    monitor: Monitor,
    handler: H,
}

impl<H> Monitored<H> {
    pub fn new(monitor: Monitor, handler: H) -> Self {
        Self { monitor, handler }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn into_inner(self) -> H {
        self.handler
    }
}

#[async_trait]
impl<H: Handler> Handler for Monitored<H> {
    async fn serve(&self, request: Request<Body>, writer: &mut dyn ResponseWriter) {
        let info = RequestInfo::from_request(&request);
        let mut monitored = self.monitor.writer(info, writer);

        self.handler.serve(request, &mut monitored).await;

        // A handler that wrote nothing still answers 200.
        if !monitored.header_written() {
            monitored.write_header(StatusCode::OK).await;
        }
    }
}

/// Tower service running a [`Handler`] against a [`BufferedWriter`].
pub struct HandlerService<H> {
    handler: Arc<H>,
}

impl<H: Handler> HandlerService<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl<H> Clone for HandlerService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
        }
    }
}

impl<H: Handler> Service<Request<Body>> for HandlerService<H> {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let handler = self.handler.clone();
        Box::pin(async move {
            let mut writer = BufferedWriter::new();
            handler.serve(request, &mut writer).await;
            Ok(writer.into_response())
        })
    }
}

//! Writer-style response surface.
//!
//! A handler receives a `&mut dyn ResponseWriter`, sets headers, writes the
//! status once and then streams body bytes. [`MonitoredWriter`] decorates any
//! writer and reports the response head to the [`Monitor`] on the first
//! status write.

use std::io;
use std::time::Instant;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Response, StatusCode};

use crate::http::RequestInfo;
use crate::monitor::Monitor;

/// Destination of a handler's response.
#[async_trait]
pub trait ResponseWriter: Send {
    /// Headers that will be sent with the status line.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Send the status line. Only the first call has an effect on the wire.
    async fn write_header(&mut self, status: StatusCode);

    /// Append body bytes. Implies `write_header(200)` if no status was sent.
    async fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

#[async_trait]
impl<'a, W: ResponseWriter + ?Sized> ResponseWriter for &'a mut W {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    async fn write_header(&mut self, status: StatusCode) {
        (**self).write_header(status).await
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf).await
    }
}

/// Collects a response in memory.
#[derive(Debug, Default)]
pub struct BufferedWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status written so far, 200 if none.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_response(self) -> Response<Body> {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

#[async_trait]
impl ResponseWriter for BufferedWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    async fn write_header(&mut self, status: StatusCode) {
        match self.status {
            Some(current) => tracing::debug!(
                current = current.as_u16(),
                ignored = status.as_u16(),
                "superfluous write_header call"
            ),
            None => self.status = Some(status),
        }
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.status.get_or_insert(StatusCode::OK);
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}

/// Where a [`MonitoredWriter`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Created,
    /// Terminal. The metric for this request has been handed off.
    HeaderWritten,
}

/// Per-request decorator that reports the first status write.
pub struct MonitoredWriter<W> {
    monitor: Monitor,
    request: RequestInfo,
    inner: W,
    started: Option<Instant>,
    state: WriterState,
}

impl<W: ResponseWriter> MonitoredWriter<W> {
    pub fn new(monitor: Monitor, request: RequestInfo, inner: W) -> Self {
        Self {
            monitor,
            request,
            inner,
            started: Some(Instant::now()),
            state: WriterState::Created,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn header_written(&self) -> bool {
        self.state == WriterState::HeaderWritten
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[async_trait]
impl<W: ResponseWriter> ResponseWriter for MonitoredWriter<W> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    async fn write_header(&mut self, status: StatusCode) {
        if self.state == WriterState::Created {
            self.monitor
                .record(self.request.clone(), status, self.started)
                .await;
            self.state = WriterState::HeaderWritten;
        }
        self.inner.write_header(status).await;
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.state == WriterState::Created {
            self.write_header(StatusCode::OK).await;
        }
        self.inner.write(buf).await
    }
}

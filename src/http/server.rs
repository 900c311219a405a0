//! Demo HTTP server.
//!
//! # Responsibilities
//! - Build an Axum Router with axum and writer-style handlers
//! - Wire up shared middleware (timeout, tracing)
//! - Put the `MonitorLayer` outside everything, so timeouts and fallback
//!   404s are reported too
//! - Serve until the shutdown future resolves

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Path, Request as AxumRequest},
    http::{header::CONTENT_TYPE, HeaderValue, Request, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Router, ServiceExt,
};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::handler::{read_body, Handler, HandlerService};
use crate::http::middleware::MonitorService;
use crate::http::writer::ResponseWriter;
use crate::monitor::Monitor;

/// HTTP server exercising both monitoring surfaces.
pub struct DemoServer {
    app: MonitorService<Router>,
    config: ServerConfig,
}

impl DemoServer {
    pub fn new(config: ServerConfig, monitor: Monitor) -> Self {
        let router = Self::build_router(&config);
        let app = monitor.layer().layer(router);
        Self { app, config }
    }

    /// Build the Axum router with all middleware layers except monitoring.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/status/{code}", any(status))
            .route("/sleep/{ms}", get(sleep))
            .route_service("/echo", HandlerService::new(Echo))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Fully layered service, for driving without a socket.
    pub fn service(&self) -> MonitorService<Router> {
        self.app.clone()
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.request_timeout_secs,
            "HTTP server starting"
        );

        let app = ServiceExt::<AxumRequest>::into_make_service(self.app);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn index() -> &'static str {
    "xmonitor demo\n"
}

/// Answers with the status named in the path.
async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("{status}\n")).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, "invalid status code\n").into_response(),
    }
}

/// Answers 200 after `ms` milliseconds.
async fn sleep(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "awake\n"
}

/// Writes the request body back with its content type.
struct Echo;

#[async_trait]
impl Handler for Echo {
    async fn serve(&self, request: Request<Body>, writer: &mut dyn ResponseWriter) {
        let (parts, body) = request.into_parts();
        let Some(body) = read_body(body, &mut *writer).await else {
            return;
        };

        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
        writer.headers_mut().insert(CONTENT_TYPE, content_type);

        if body.is_empty() {
            writer.write_header(StatusCode::NO_CONTENT).await;
            return;
        }
        if let Err(e) = writer.write(&body).await {
            tracing::debug!(error = %e, "echo write failed");
        }
    }
}

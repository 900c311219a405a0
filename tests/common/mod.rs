//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use xmonitor::{Delivery, Destination, MonitorConfig};

/// One POST received by the mock collector.
#[derive(Debug)]
pub struct Captured {
    pub method: String,
    pub path: String,
    /// Lowercased header names.
    pub headers: HashMap<String, String>,
    pub body: serde_json::Value,
}

/// Start a collector answering `status` immediately.
pub async fn start_collector(status: u16) -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    start_slow_collector(status, Duration::ZERO).await
}

/// Start a collector that records each request, waits `delay`, then answers `status`.
#[allow(dead_code)]
pub async fn start_slow_collector(
    status: u16,
    delay: Duration,
) -> (SocketAddr, mpsc::UnboundedReceiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        handle_connection(socket, status, delay, tx).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

async fn handle_connection(
    mut socket: TcpStream,
    status: u16,
    delay: Duration,
    tx: mpsc::UnboundedSender<Captured>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let body_start = head_end + 4;
    while buf.len() < body_start + content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let body = serde_json::from_slice(&buf[body_start..body_start + content_length])
        .unwrap_or(serde_json::Value::Null);
    let _ = tx.send(Captured {
        method,
        path,
        headers,
        body,
    });

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let reason = match status {
        200 => "OK",
        201 => "Created",
        500 => "Internal Server Error",
        _ => "Unknown",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status, reason
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Monitor config pointing at a mock collector, blocking delivery, quiet.
pub fn collector_config(addr: SocketAddr) -> MonitorConfig {
    let destination =
        Destination::Custom(format!("http://{}/metrics/create", addr).parse().unwrap());
    let mut config = MonitorConfig::with_destination(destination);
    config.token = "test-token".to_string();
    config.delivery = Delivery::Blocking;
    config.logging_enabled = false;
    config.timeout_ms = 2000;
    config
}

/// Destination nothing listens on.
#[allow(dead_code)]
pub async fn unreachable_destination() -> Destination {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Destination::Custom(format!("http://{}/metrics/create", addr).parse().unwrap())
}

/// Wait for the next metric, up to one second.
pub async fn next_metric(rx: &mut mpsc::UnboundedReceiver<Captured>) -> Captured {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("no metric within 1s")
        .expect("collector stopped")
}

/// Assert nothing else arrives within a short grace period.
#[allow(dead_code)]
pub async fn assert_no_more_metrics(rx: &mut mpsc::UnboundedReceiver<Captured>) {
    let extra = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(extra.is_err(), "unexpected extra metric: {:?}", extra);
}

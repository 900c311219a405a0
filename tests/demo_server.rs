//! Demo server over a real socket.

use std::net::SocketAddr;
use std::time::Duration;

use xmonitor::config::ServerConfig;
use xmonitor::http::DemoServer;
use xmonitor::lifecycle::Shutdown;
use xmonitor::Monitor;

mod common;

async fn start_server(monitor: Monitor) -> (SocketAddr, Shutdown) {
    start_server_with(ServerConfig::default(), monitor).await
}

async fn start_server_with(config: ServerConfig, monitor: Monitor) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = DemoServer::new(config, monitor);
    let signal = shutdown.signal();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    (addr, shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn axum_routes_are_monitored() {
    let (collector, mut rx) = common::start_collector(201).await;
    let monitor = Monitor::new(common::collector_config(collector)).unwrap();
    let (addr, shutdown) = start_server(monitor).await;

    let res = client()
        .get(format!("http://{}/status/404?probe=1", addr))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 404);

    let metric = common::next_metric(&mut rx).await;
    assert_eq!(metric.body["request"]["method"], "GET");
    assert_eq!(metric.body["request"]["uri"], "/status/404?probe=1");
    assert_eq!(metric.body["request"]["host"], addr.to_string());
    assert_eq!(metric.body["response"]["status"], 404);
    common::assert_no_more_metrics(&mut rx).await;

    shutdown.trigger();
}

#[tokio::test]
async fn writer_routes_are_monitored() {
    let (collector, mut rx) = common::start_collector(201).await;
    let monitor = Monitor::new(common::collector_config(collector)).unwrap();
    let (addr, shutdown) = start_server(monitor).await;

    let res = client()
        .post(format!("http://{}/echo", addr))
        .header("content-type", "text/plain")
        .body("hello")
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.text().await.unwrap(), "hello");

    let metric = common::next_metric(&mut rx).await;
    assert_eq!(metric.body["request"]["method"], "POST");
    assert_eq!(metric.body["request"]["uri"], "/echo");
    assert_eq!(metric.body["response"]["status"], 200);
    common::assert_no_more_metrics(&mut rx).await;

    let res = client()
        .post(format!("http://{}/echo", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 204);
    let metric = common::next_metric(&mut rx).await;
    assert_eq!(metric.body["response"]["status"], 204);

    shutdown.trigger();
}

#[tokio::test]
async fn unmatched_routes_are_monitored() {
    let (collector, mut rx) = common::start_collector(201).await;
    let monitor = Monitor::new(common::collector_config(collector)).unwrap();
    let (addr, shutdown) = start_server(monitor).await;

    let res = client()
        .get(format!("http://{}/no/such/route", addr))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 404);

    let metric = common::next_metric(&mut rx).await;
    assert_eq!(metric.body["request"]["uri"], "/no/such/route");
    assert_eq!(metric.body["response"]["status"], 404);
    common::assert_no_more_metrics(&mut rx).await;

    shutdown.trigger();
}

#[tokio::test]
async fn timed_out_requests_are_monitored() {
    let (collector, mut rx) = common::start_collector(201).await;
    let monitor = Monitor::new(common::collector_config(collector)).unwrap();
    let config = ServerConfig {
        request_timeout_secs: 1,
        ..ServerConfig::default()
    };
    let (addr, shutdown) = start_server_with(config, monitor).await;

    let res = client()
        .get(format!("http://{}/sleep/3000", addr))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 408);

    let metric = common::next_metric(&mut rx).await;
    assert_eq!(metric.body["request"]["uri"], "/sleep/3000");
    assert_eq!(metric.body["response"]["status"], 408);

    shutdown.trigger();
}

#[tokio::test]
async fn server_stops_on_shutdown() {
    let (collector, _rx) = common::start_collector(201).await;
    let monitor = Monitor::new(common::collector_config(collector)).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let shutdown = Shutdown::new();
    let server = DemoServer::new(ServerConfig::default(), monitor);
    let handle = tokio::spawn(server.run(listener, shutdown.signal()));

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("server did not stop");
    assert!(result.unwrap().is_ok());
}

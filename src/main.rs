//! xmonitor command line.
//!
//! ```text
//! xmonitor serve [--config xmonitor.toml]
//!     demo server, every route reports to the collector
//!
//! xmonitor send --uri /foo --status 404 [--config xmonitor.toml]
//!     one synchronous metric, prints the collector's verdict
//! ```

use std::path::PathBuf;

use axum::http::{Method, StatusCode};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use xmonitor::config::{load_config, AppConfig};
use xmonitor::http::DemoServer;
use xmonitor::lifecycle::shutdown_signal;
use xmonitor::observability::init_logging;
use xmonitor::{Monitor, RequestInfo};

#[derive(Parser)]
#[command(name = "xmonitor")]
#[command(about = "HTTP request monitoring middleware", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the collector destination (preset name or URL).
    #[arg(short, long, global = true)]
    destination: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitored demo server
    Serve,
    /// Send a single metric and report the outcome
    Send {
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long, default_value = "/")]
        uri: String,
        #[arg(long)]
        host: Option<String>,
        #[arg(long, default_value_t = 200)]
        status: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(destination) = cli.destination {
        config.monitor.destination = destination.try_into()?;
    }

    init_logging(&config.observability.log_level);
    tracing::info!("xmonitor v{} starting", env!("CARGO_PKG_VERSION"));

    let monitor = Monitor::new(config.monitor.clone())?;
    tracing::info!(
        destination = %monitor.endpoint(),
        delivery = ?config.monitor.delivery,
        metrics_enabled = config.monitor.metrics_enabled,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Serve => {
            let listener = TcpListener::bind(&config.server.bind_address).await?;
            let server = DemoServer::new(config.server.clone(), monitor);
            server.run(listener, shutdown_signal()).await?;
            tracing::info!("Shutdown complete");
        }
        Commands::Send {
            method,
            uri,
            host,
            status,
        } => {
            let request = RequestInfo {
                method: Method::from_bytes(method.to_ascii_uppercase().as_bytes())?,
                uri,
                host,
            };
            let status = StatusCode::from_u16(status)?;
            match monitor.send_metric(&request, status, None).await {
                Ok(()) => println!("metric accepted by {}", monitor.endpoint()),
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

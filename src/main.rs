//! Filepress forwarding proxy
//!
//! Sits between the browser and the file-processing backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                FILEPRESS PROXY               │
//!                         │                                              │
//!     Browser request     │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!     ────────────────────┼─▶│  http   │──▶│ routing  │──▶│  forward  │──┼──▶ Backend
//!                         │  │ server  │   │ action / │   │ reqwest   │  │    /api/...
//!                         │  └─────────┘   │ resource │   │  client   │  │
//!                         │       ▲        └──────────┘   └─────┬─────┘  │
//!     Browser response    │  ┌────┴─────┐                       │        │
//!     ◀───────────────────┼──│ response │◀──────────────────────┘        │
//!                         │  │ reshape/ │                                │
//!                         │  │ stream   │                                │
//!                         │  └──────────┘                                │
//!                         │                                              │
//!                         │   config · observability · lifecycle         │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use filepress_proxy::config::{resolve_config, UPSTREAM_URL_ENV};
use filepress_proxy::lifecycle::{wait_for_signal, Shutdown};
use filepress_proxy::observability::{logging, metrics};
use filepress_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "filepress-proxy")]
#[command(about = "Forwarding proxy for the Filepress processing backend", long_about = None)]
struct Args {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = resolve_config(args.config.as_deref(), std::env::var(UPSTREAM_URL_ENV).ok())?;
    logging::init_logging(&config.observability);

    tracing::info!("filepress-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = ?config.timeouts.request_secs,
        max_body_size = config.limits.max_body_size,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // validated at load time
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

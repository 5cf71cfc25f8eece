//! Image Relay Gateway
//!
//! A relay for an AI image-generation backend, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │                 RELAY GATEWAY                  │
//!                     │                                                │
//!  Client Request     │  ┌─────────┐   ┌──────────┐   ┌────────────┐  │
//!  ───────────────────┼─▶│  http   │──▶│ handlers │──▶│  upstream  │──┼──▶ Image
//!                     │  │ server  │   │ validate │   │   client   │  │    Backend
//!                     │  └─────────┘   └──────────┘   └─────┬──────┘  │
//!                     │                                      │         │
//!  Client Response    │  ┌─────────┐   ┌───────────┐        │         │
//!  ◀──────────────────┼──│response │◀──│ normalize │◀───────┘         │
//!                     │  │envelope │   │           │                  │
//!                     │  └─────────┘   └───────────┘                  │
//!                     │                                                │
//!                     │  ┌──────────────────────────────────────────┐ │
//!                     │  │          Cross-Cutting Concerns           │ │
//!                     │  │  ┌────────┐ ┌─────────────┐ ┌──────────┐ │ │
//!                     │  │  │ config │ │observability│ │lifecycle │ │ │
//!                     │  │  └────────┘ └─────────────┘ └──────────┘ │ │
//!                     │  └──────────────────────────────────────────┘ │
//!                     └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use image_relay::config::{load_config, RelayConfig};
use image_relay::http::HttpServer;
use image_relay::lifecycle::{signals, Shutdown};
use image_relay::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "image-relay")]
#[command(about = "HTTP relay gateway for an AI image-generation backend", long_about = None)]
struct Args {
    /// Path to the TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let args = Args::parse();

    tracing::info!("image-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

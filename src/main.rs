//! Webhook gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!   gateway event ─┐
//!   HTTP request ──┼─▶ RawRequest ─▶ HookData ─▶ Normalizer ─▶ Delivery (fan-out)
//!   raw socket ────┘                                               │
//!                                                                  ▼
//!   response ◀──────────────────────────────────────────── ResponseInfo (max status)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use webhook_gateway::config::{load_config, validation::validate_config, ConfigError};
use webhook_gateway::lifecycle::{wait_for_signal, Shutdown};
use webhook_gateway::net::Listener;
use webhook_gateway::observability::{logging, metrics};
use webhook_gateway::transport::EventLoopServer;
use webhook_gateway::{GatewayConfig, HookPipeline, HttpServer};

#[derive(Parser, Debug)]
#[command(name = "webhook-gateway", version, about = "Webhook normalization gateway")]
struct Args {
    /// Path to a TOML config file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overriding the config file. `RUST_LOG` wins over both.
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let config = GatewayConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            config
        }
    };

    let level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init_logging(level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "webhook-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        event_loop = config.event_loop.enabled,
        routes = config.routes.len(),
        outputs = config.outputs.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let pipeline = HookPipeline::from_config(&config);
    tracing::info!(providers = ?pipeline.registry().keys(), "Providers registered");

    let shutdown = Shutdown::new();

    let event_loop = if config.event_loop.enabled {
        let listener = Listener::bind(&config.event_loop).await?;
        let server = EventLoopServer::new(config.event_loop.clone(), pipeline.clone());
        Some(tokio::spawn(server.run(listener, shutdown.subscribe())))
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, pipeline);
    let http = tokio::spawn(server.run(listener, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();

    http.await??;
    if let Some(handle) = event_loop {
        handle.await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

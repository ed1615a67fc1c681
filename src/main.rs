//! Driver API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  GATEWAY                     │
//!                      │                                              │
//!   Client Request     │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ───────────────────┼─▶│ routing │──▶│  rate    │──▶│ forwarder │──┼──▶ driver-service
//!                      │  │  table  │   │ limiter  │   │           │  │
//!                      │  └────┬────┘   └────┬─────┘   └─────┬─────┘  │
//!                      │       │ /health     │ 429           │        │
//!   Client Response    │       ▼             ▼               ▼        │
//!   ◀──────────────────┼──────────────── JSON / relayed body ─────────┼─── status, Content-Type, body
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use driver_gateway::config::{resolve_config, ConfigOverrides};
use driver_gateway::lifecycle::Shutdown;
use driver_gateway::observability::{logging, metrics};
use driver_gateway::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "driver-gateway")]
#[command(about = "Rate-limiting API gateway for the driver service", long_about = None)]
struct Cli {
    /// Optional TOML config file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Base URL of the driver service.
    #[arg(long, env = "DRIVER_SERVICE_URL")]
    driver_service_url: Option<String>,

    /// Port to listen on.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Maximum requests per client per window.
    #[arg(long)]
    rate_limit: Option<u32>,

    /// Rate limit window in milliseconds.
    #[arg(long)]
    rate_window_ms: Option<u64>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            upstream_url: self.driver_service_url.clone(),
            port: self.port,
            rate_limit: self.rate_limit,
            rate_window_ms: self.rate_window_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), &cli.overrides())?;

    logging::init_logging(&config.observability);
    tracing::info!("driver-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        rate_limit = config.rate_limit.limit,
        rate_window_ms = config.rate_limit.window_ms,
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

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown.trigger_on_signal());

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! RDF relay (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                    RDF RELAY                     │
//!                      │                                                  │
//!   GET /r/<uri>       │  ┌─────────┐   ┌─────────────┐   ┌──────────┐    │
//!   ───────────────────┼─▶│  gate   │──▶│ negotiation │──▶│ fetcher  │────┼──▶ RDF
//!                      │  └────┬────┘   └──────┬──────┘   └────┬─────┘    │    publisher
//!                      │       │ 400/404       │ 400           │ redirect │
//!                      │       ▼               ▼               ▼  chain   │
//!   response           │  ┌──────────────────────────────────────────┐    │
//!   ◀──────────────────┼──│ cors  ◀──  classify (relay / 422 / 599)  │    │
//!                      │  └──────────────────────────────────────────┘    │
//!                      │                                                  │
//!   OPTIONS /**  ──────┼──▶ 204 + CORS                                    │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use rdf_relay::config::{load_config, validation::validate_config, ConfigError, RelayConfig};
use rdf_relay::observability::{logging, metrics};
use rdf_relay::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "rdf-relay")]
#[command(about = "CORS-enabling relay for RDF documents", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override observability.log_level.
    #[arg(long)]
    log_level: Option<String>,
}

fn resolve_config(cli: &Cli) -> Result<RelayConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("rdf-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.upstream.request_timeout_secs,
        max_redirects = config.upstream.max_redirects,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let _signals = shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

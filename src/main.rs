//! API Gateway
//!
//! Authenticating reverse proxy built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌──────────────────────────────────────────────────────┐
//!                              │                     API GATEWAY                      │
//!                              │                                                      │
//!     Client Request           │  ┌─────────┐    ┌──────────┐    ┌──────────────┐     │
//!     ─────────────────────────┼─▶│  http   │───▶│ routing  │───▶│     auth     │     │
//!                              │  │ server  │    │  table   │    │   verifier   │     │
//!                              │  └─────────┘    └──────────┘    └──────┬───────┘     │
//!                              │                                        │ (not /auth) │
//!                              │                                        ▼             │
//!     Client Response          │  ┌─────────┐                    ┌──────────────┐     │
//!     ◀────────────────────────┼──│response │◀───────────────────│    proxy     │◀────┼──── Upstream
//!                              │  │ relay   │                    │   handler    │     │     Service
//!                              │  └─────────┘                    └──────────────┘     │
//!                              │                                                      │
//!                              │  config · lifecycle · observability · resilience     │
//!                              └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::{load_config, GatewayConfig};
use api_gateway::lifecycle::{bootstrap, Shutdown};
use api_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "Authenticating API gateway", long_about = None)]
struct Cli {
    /// Gateway settings file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Route file (JSON) with one upstream URL per service.
    #[arg(long)]
    routes: Option<String>,

    /// PEM file holding the token verification key.
    #[arg(long)]
    public_key: Option<String>,

    /// Listener address, e.g. 0.0.0.0:8080.
    #[arg(long)]
    bind: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<GatewayConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => GatewayConfig::default(),
        };
        if let Some(routes) = self.routes {
            config.routes_file = routes;
        }
        if let Some(public_key) = self.public_key {
            config.auth.public_key_path = public_key;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability);
    tracing::info!("api-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let bind_address = config.listener.bind_address.clone();
    let observability = config.observability.clone();

    // Every fatal check runs before the listener binds.
    let server = match bootstrap(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    tracing::info!(
        bind_address = %bind_address,
        request_timeout_secs = server.config().timeouts.request_secs,
        upstream_timeout_secs = server.config().timeouts.upstream_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    if observability.metrics_enabled {
        if let Ok(addr) = observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

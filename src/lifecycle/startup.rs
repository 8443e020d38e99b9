//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate the gateway settings
//! - Load the route file and build the router table
//! - Load the verification key once
//! - Assemble the HTTP server, ready to bind
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Nothing binds a socket until every check has passed

use std::path::Path;
use std::sync::Arc;

use crate::auth::{KeyLoadError, TokenVerifier, VerificationKey};
use crate::config::validation::validate_config;
use crate::config::{load_routes, ConfigError, GatewayConfig, ValidationError};
use crate::http::HttpServer;
use crate::routing::RouterTable;

/// Fatal error found before the listener binds.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unable to define routes: {}", join(.0))]
    Routes(Vec<ValidationError>),

    #[error(transparent)]
    Key(#[from] KeyLoadError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the router table from the configured route file.
pub fn load_router_table(config: &GatewayConfig) -> Result<RouterTable, StartupError> {
    let routes = load_routes(Path::new(&config.routes_file))?;
    let table = RouterTable::from_routes_file(&routes).map_err(StartupError::Routes)?;

    for entry in table.entries() {
        tracing::info!(
            service = %entry.service(),
            prefix = %entry.prefix(),
            upstream = %entry.upstream(),
            requires_auth = entry.requires_auth(),
            "Route registered"
        );
    }

    Ok(table)
}

/// Run every startup check and assemble the server.
pub fn bootstrap(config: GatewayConfig) -> Result<HttpServer, StartupError> {
    validate_config(&config).map_err(|errors| StartupError::Config(ConfigError::Validation(errors)))?;

    let table = load_router_table(&config)?;

    let key = VerificationKey::load(Path::new(&config.auth.public_key_path))?;
    tracing::info!(path = %config.auth.public_key_path, "Verification key loaded");

    Ok(HttpServer::new(config, table, Arc::new(TokenVerifier::new(key))))
}

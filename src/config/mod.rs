//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! gateway.toml (optional)            routes.json
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig / RoutesFile (validated, immutable)
//!     → RouterTable built once, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All gateway settings have defaults to allow running without a file
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_routes, ConfigError};
pub use schema::{
    AuthConfig, GatewayConfig, LimitsConfig, ListenerConfig, ObservabilityConfig, RoutesFile,
    TimeoutConfig,
};
pub use validation::ValidationError;

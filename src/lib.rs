//! API gateway library.
//!
//! Authenticates inbound requests with a signed token and forwards them to
//! the upstream service owning the request's path prefix.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouterTable;

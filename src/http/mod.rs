//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, one binding per route prefix)
//!     → request.rs (request ID)
//!     → routing (RouteEntry + path remainder)
//!     → proxy.rs (token check, upstream request, deadline)
//!     → response.rs (status, Content-Type, body)   | error.rs (JSON error)
//!     → Send to client
//! ```

pub mod error;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;

pub use error::ProxyError;
pub use proxy::ProxyHandler;
pub use request::X_REQUEST_ID;
pub use response::UpstreamResponse;
pub use server::{AppState, HttpServer};

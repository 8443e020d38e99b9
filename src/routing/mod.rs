//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (route lookup)
//!     → matcher.rs (segment-aware prefix match)
//!     → Return: matched RouteEntry + path remainder, or None
//!
//! Route Compilation (at startup):
//!     RoutesFile
//!     → validate each upstream URL
//!     → one RouteEntry per logical service
//!     → Freeze as immutable RouterTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - Whether a route needs a token is data on the entry, not a separate handler

pub mod matcher;
pub mod router;

pub use router::{Resolved, RouteEntry, RouterTable, EXEMPT_SERVICE};

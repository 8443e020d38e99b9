//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (connect deadline on the connector,
//!                    exchange deadline around send + body read)
//!     → On expiry: 500 to the caller, server keeps serving
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - No retries: the inbound body is streamed once and cannot be replayed

pub mod timeouts;

pub use timeouts::UpstreamDeadline;

//! Token authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     public key file → key.rs (PEM envelope, RSA check) → VerificationKey
//!     → verifier.rs (TokenVerifier, shared via Arc)
//!
//! Per request (non-exempt routes only):
//!     Authorization header → header.rs (`<scheme>:<token>`)
//!     → verifier.rs (signature + exp/nbf) → accept or 401
//! ```
//!
//! # Design Decisions
//! - Key is parsed exactly once; verification never touches the filesystem
//! - Verification failures are values, never panics

pub mod header;
pub mod key;
pub mod verifier;

pub use header::{bearer_token, AuthHeaderError};
pub use key::{KeyLoadError, VerificationKey};
pub use verifier::{TokenError, TokenVerifier, VerifiedToken};

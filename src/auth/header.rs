//! `Authorization` header parsing.
//!
//! Clients send `Authorization: <scheme>:<token>`; the token is whatever
//! follows the first colon.

use axum::http::{header::AUTHORIZATION, HeaderMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthHeaderError {
    #[error("missing Authorization header")]
    Missing,

    #[error("malformed Authorization header")]
    Malformed,
}

/// Extract the token from an `Authorization` header value.
pub fn token_from_value(value: &str) -> Result<&str, AuthHeaderError> {
    let (_scheme, token) = value.split_once(':').ok_or(AuthHeaderError::Malformed)?;
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthHeaderError::Malformed);
    }
    Ok(token)
}

/// Extract the token from a request's headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthHeaderError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthHeaderError::Missing)?;
    let value = value.to_str().map_err(|_| AuthHeaderError::Malformed)?;
    token_from_value(value)
}

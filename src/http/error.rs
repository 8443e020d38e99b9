//! Per-request failures and their HTTP rendering.
//!
//! Every failure while handling a request ends here as a JSON body
//! `{"error": "..."}`; none of them stop the server.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthHeaderError;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("missing Authorization header")]
    AuthHeaderMissing,

    #[error("malformed Authorization header, expected '<scheme>:<token>'")]
    AuthHeaderMalformed,

    #[error("Invalid or expired token")]
    TokenInvalidOrExpired,

    #[error("error creating request: {0}")]
    UpstreamRequestInvalid(#[source] axum::http::Error),

    #[error("error sending request: {0}")]
    UpstreamDialFailed(#[source] hyper_util::client::legacy::Error),

    #[error("upstream did not answer within {0:?}")]
    UpstreamTimedOut(Duration),

    #[error("error reading response body: {0}")]
    UpstreamResponseUnreadable(#[source] axum::Error),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::AuthHeaderMissing
            | ProxyError::AuthHeaderMalformed
            | ProxyError::TokenInvalidOrExpired => StatusCode::UNAUTHORIZED,
            ProxyError::UpstreamRequestInvalid(_)
            | ProxyError::UpstreamDialFailed(_)
            | ProxyError::UpstreamTimedOut(_)
            | ProxyError::UpstreamResponseUnreadable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short stable name for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::AuthHeaderMissing => "auth_header_missing",
            ProxyError::AuthHeaderMalformed => "auth_header_malformed",
            ProxyError::TokenInvalidOrExpired => "token_invalid",
            ProxyError::UpstreamRequestInvalid(_) => "upstream_request_invalid",
            ProxyError::UpstreamDialFailed(_) => "upstream_dial_failed",
            ProxyError::UpstreamTimedOut(_) => "upstream_timed_out",
            ProxyError::UpstreamResponseUnreadable(_) => "upstream_response_unreadable",
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.status_code() == StatusCode::UNAUTHORIZED
    }
}

impl From<AuthHeaderError> for ProxyError {
    fn from(err: AuthHeaderError) -> Self {
        match err {
            AuthHeaderError::Missing => ProxyError::AuthHeaderMissing,
            AuthHeaderError::Malformed => ProxyError::AuthHeaderMalformed,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

/// JSON error body used for every gateway-generated failure.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

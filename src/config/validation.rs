//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, bind address parses)
//! - Request timeout must exceed the upstream deadline
//! - Validate upstream base URLs (non-empty, absolute, http, has a host)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure functions, run before anything binds a socket

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("route prefix must not be empty")]
    EmptyPrefix,

    #[error("duplicate route prefix '{prefix}'")]
    DuplicatePrefix { prefix: String },

    #[error("unable to define route '/{service}': upstream URL is empty")]
    EmptyUpstream { service: String },

    #[error("upstream for '/{service}' is not a valid URL ({url}): {reason}")]
    InvalidUpstream {
        service: String,
        url: String,
        reason: String,
    },

    #[error("upstream for '/{service}' must use http, found '{scheme}'")]
    UnsupportedScheme { service: String, scheme: String },

    #[error("invalid bind address '{address}'")]
    InvalidBindAddress { address: String },

    #[error("'{field}' must be greater than zero")]
    Zero { field: &'static str },

    #[error("timeouts.request_secs ({request}) must exceed timeouts.upstream_secs ({upstream})")]
    TimeoutOrder { request: u64, upstream: u64 },
}

/// Validate the operational settings.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress {
            address: config.listener.bind_address.clone(),
        });
    }

    let positive = [
        ("timeouts.connect_secs", config.timeouts.connect_secs as usize),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs as usize),
        ("timeouts.request_secs", config.timeouts.request_secs as usize),
        ("limits.max_response_body_bytes", config.limits.max_response_body_bytes),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    // The upstream deadline must fire before the outer request timeout.
    let timeouts = &config.timeouts;
    if timeouts.request_secs <= timeouts.upstream_secs {
        errors.push(ValidationError::TimeoutOrder {
            request: timeouts.request_secs,
            upstream: timeouts.upstream_secs,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate one upstream base URL and return it parsed.
pub fn validate_upstream(service: &str, upstream: &str) -> Result<Url, ValidationError> {
    let trimmed = upstream.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUpstream {
            service: service.to_string(),
        });
    }

    let url = Url::parse(trimmed).map_err(|e| ValidationError::InvalidUpstream {
        service: service.to_string(),
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" {
        return Err(ValidationError::UnsupportedScheme {
            service: service.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::InvalidUpstream {
            service: service.to_string(),
            url: trimmed.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

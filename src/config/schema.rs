//! Configuration schema definitions.
//!
//! Two documents feed the gateway at startup:
//! - [`GatewayConfig`]: operational settings (TOML), every field defaulted.
//! - [`RoutesFile`]: the upstream base URL for each logical service (JSON).

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Path to the JSON route file.
    pub routes_file: String,

    /// Token verification settings.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Upstream response size limit.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            routes_file: "routes.json".to_string(),
            auth: AuthConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Token verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Path to the PEM-encoded public key used to verify tokens.
    pub public_key_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            public_key_path: "client_public_secret.txt".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for one upstream exchange (send + read response) in seconds.
    pub upstream_secs: u64,

    /// Total time allowed for an inbound request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}

/// Upstream response size limit.
///
/// Inbound request bodies are streamed to the upstream uncapped.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum upstream response body size in bytes.
    pub max_response_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_response_body_bytes: 32 * 1024 * 1024, // 32MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Upstream base URLs, one per logical service.
///
/// Absent fields deserialize as empty strings so that validation reports
/// "missing" and "empty" the same way.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RoutesFile {
    pub auth: String,
    pub routes: String,
    pub hotels: String,
    pub events: String,
    pub booking: String,
    pub transport: String,
}

impl RoutesFile {
    /// `(service, upstream)` pairs in registration order.
    pub fn services(&self) -> [(&'static str, &str); 6] {
        [
            ("auth", &self.auth),
            ("transport", &self.transport),
            ("routes", &self.routes),
            ("hotels", &self.hotels),
            ("events", &self.events),
            ("booking", &self.booking),
        ]
    }
}

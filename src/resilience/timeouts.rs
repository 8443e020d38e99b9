//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound upstream connection establishment
//! - Bound one upstream exchange (send, then read the full response)
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other upstream errors
//! - Dropping the timed-out future abandons the upstream call

use std::future::Future;
use std::time::Duration;

use hyper_util::client::legacy::connect::HttpConnector;
use tokio::time::error::Elapsed;

use crate::config::TimeoutConfig;

/// Deadlines applied to every upstream call.
#[derive(Debug, Clone, Copy)]
pub struct UpstreamDeadline {
    connect: Duration,
    exchange: Duration,
}

impl UpstreamDeadline {
    pub fn new(connect: Duration, exchange: Duration) -> Self {
        Self { connect, exchange }
    }

    pub fn from_config(config: &TimeoutConfig) -> Self {
        Self::new(
            Duration::from_secs(config.connect_secs),
            Duration::from_secs(config.upstream_secs),
        )
    }

    pub fn connect(&self) -> Duration {
        self.connect
    }

    pub fn exchange(&self) -> Duration {
        self.exchange
    }

    /// An HTTP connector honoring the connect deadline.
    pub fn connector(&self) -> HttpConnector {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(self.connect));
        connector.set_nodelay(true);
        connector
    }

    /// Run `fut` under the exchange deadline.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Elapsed> {
        tokio::time::timeout(self.exchange, fut).await
    }
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router, one binding per configured route prefix
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind server to listener
//! - Hand each request to the proxy handler and map failures to responses

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::TokenVerifier;
use crate::config::GatewayConfig;
use crate::http::error::error_response;
use crate::http::proxy::ProxyHandler;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::{metrics, tracing::make_request_span};
use crate::resilience::UpstreamDeadline;
use crate::routing::RouterTable;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouterTable>,
    pub proxy: Arc<ProxyHandler>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server from an already validated table and key.
    pub fn new(config: GatewayConfig, table: RouterTable, verifier: Arc<TokenVerifier>) -> Self {
        let proxy = ProxyHandler::new(
            verifier,
            UpstreamDeadline::from_config(&config.timeouts),
            config.limits.max_response_body_bytes,
        );

        let state = AppState {
            table: Arc::new(table),
            proxy: Arc::new(proxy),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Each prefix is bound for any method at `/p`, `/p/` and `/p/{*rest}`;
    /// everything else falls through to a JSON 404.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new();
        for entry in state.table.entries() {
            let prefix = entry.prefix();
            router = router
                .route(prefix, any(proxy_handler))
                .route(&format!("{prefix}/"), any(proxy_handler))
                .route(&format!("{prefix}/{{*rest}}"), any(proxy_handler));
        }

        router
            .fallback(route_not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server until a signal arrives or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Forward one request to the upstream owning its prefix.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let path = request.uri().path().to_string();
    let method = request.method().to_string();

    let Some(resolved) = state.table.resolve(&path) else {
        return route_not_found(request).await;
    };
    let service = resolved.route.service();

    match state
        .proxy
        .forward(resolved.route, resolved.remainder, request)
        .await
    {
        Ok(upstream) => {
            tracing::debug!(
                request_id = %request_id,
                service = %service,
                status = upstream.status.as_u16(),
                bytes = upstream.body.len(),
                "Upstream responded"
            );
            metrics::record_request(&method, upstream.status.as_u16(), service, start_time);
            upstream.into_response()
        }
        Err(e) => {
            if e.is_auth_failure() {
                tracing::warn!(request_id = %request_id, service = %service, path = %path, error = %e, "Request rejected");
            } else {
                tracing::error!(request_id = %request_id, service = %service, path = %path, error = %e, "Upstream error");
            }
            metrics::record_failure(service, e.kind());
            metrics::record_request(&method, e.status_code().as_u16(), service, start_time);
            e.into_response()
        }
    }
}

async fn route_not_found(request: Request<Body>) -> Response {
    let path = request.uri().path();
    tracing::warn!(request_id = %request_id(request.headers()), path = %path, "No route matched");
    error_response(
        StatusCode::NOT_FOUND,
        format!("no route configured for {path}"),
    )
}

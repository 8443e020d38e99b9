//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use api_gateway::auth::{TokenVerifier, VerificationKey};
use api_gateway::config::{GatewayConfig, RoutesFile};
use api_gateway::{HttpServer, RouterTable, Shutdown};
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, HeaderMap, Request, Response, StatusCode},
    Router,
};
use jsonwebtoken::{encode, get_current_timestamp, Algorithm, EncodingKey, Header};
use serde_json::json;
use tokio::net::TcpListener;

pub fn key_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/keys")
        .join(name)
}

fn sign(private_key: &str, claims: serde_json::Value) -> String {
    let pem = std::fs::read(key_path(private_key)).unwrap();
    let key = EncodingKey::from_rsa_pem(&pem).unwrap();
    encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
}

/// A token the gateway accepts.
pub fn valid_token(subject: &str) -> String {
    sign(
        "test_private.pem",
        json!({ "sub": subject, "exp": get_current_timestamp() + 600 }),
    )
}

/// Well-formed, unexpired, signed with a key the gateway does not trust.
pub fn rogue_token(subject: &str) -> String {
    sign(
        "rogue_private.pem",
        json!({ "sub": subject, "exp": get_current_timestamp() + 600 }),
    )
}

pub fn expired_token(subject: &str) -> String {
    sign(
        "test_private.pem",
        json!({ "sub": subject, "exp": get_current_timestamp() - 3600 }),
    )
}

/// What an upstream saw.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// What an upstream answers.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: Some(content_type),
            body: body.into(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<Captured>>>,
}

impl MockUpstream {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn calls(&self) -> Vec<Captured> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Start a programmable upstream on an ephemeral port.
pub async fn start_upstream<F>(reply: F) -> MockUpstream
where
    F: Fn(&Captured) -> Reply + Clone + Send + Sync + 'static,
{
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = calls.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let recorded = recorded.clone();
        let reply = reply.clone();
        async move {
            let (parts, body) = request.into_parts();
            let captured = Captured {
                method: parts.method.to_string(),
                path_and_query: parts
                    .uri
                    .path_and_query()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                headers: parts.headers,
                body: to_bytes(body, usize::MAX).await.unwrap().to_vec(),
            };
            let answer = reply(&captured);
            recorded.lock().unwrap().push(captured);

            if let Some(delay) = answer.delay {
                tokio::time::sleep(delay).await;
            }

            let mut response = Response::builder().status(StatusCode::from_u16(answer.status).unwrap());
            if let Some(content_type) = answer.content_type {
                response = response.header(CONTENT_TYPE, content_type);
            }
            response.body(Body::from(answer.body)).unwrap()
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, calls }
}

/// Upstream answering 200 with `"<METHOD> <path?query>"`.
pub async fn start_echo_upstream() -> MockUpstream {
    start_upstream(|seen: &Captured| {
        Reply::new(
            200,
            "text/plain",
            format!("{} {}", seen.method, seen.path_and_query),
        )
    })
    .await
}

/// An address nothing listens on.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Route file pointing every service at `url_for(service)`.
pub fn routes_with(url_for: impl Fn(&str) -> String) -> RoutesFile {
    RoutesFile {
        auth: url_for("auth"),
        routes: url_for("routes"),
        hotels: url_for("hotels"),
        events: url_for("events"),
        booking: url_for("booking"),
        transport: url_for("transport"),
    }
}

pub struct Gateway {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a gateway on an ephemeral port trusting `tests/keys/test_public.pem`.
pub async fn start_gateway(routes: RoutesFile, tweak: impl FnOnce(&mut GatewayConfig)) -> Gateway {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    tweak(&mut config);

    let table = RouterTable::from_routes_file(&routes).unwrap();
    let key = VerificationKey::load(&key_path("test_public.pem")).unwrap();
    let server = HttpServer::new(config, table, Arc::new(TokenVerifier::new(key)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Gateway { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(20))
        .build()
        .unwrap()
}

/// Fail the test if `fut` takes longer than `limit`.
pub async fn within<F: Future>(limit: Duration, fut: F) -> F::Output {
    tokio::time::timeout(limit, fut)
        .await
        .expect("operation did not finish in time")
}

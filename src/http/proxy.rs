//! Per-request forwarding.
//!
//! # Responsibilities
//! - Verify the caller's token unless the route is exempt
//! - Rewrite the target to `<upstream>/<remainder>[?query]`
//! - Copy method, headers and the body stream onto the upstream request
//! - Read the upstream answer under a deadline
//!
//! One handler serves every route; whether a token is needed is read from
//! the [`RouteEntry`].

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, HOST},
        HeaderMap, Request,
    },
};
use hyper::{body::Incoming, Response};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::auth::{bearer_token, TokenVerifier, VerifiedToken};
use crate::http::error::ProxyError;
use crate::http::response::UpstreamResponse;
use crate::resilience::UpstreamDeadline;
use crate::routing::RouteEntry;

/// Forwards requests to upstreams. Shared by all concurrent requests.
pub struct ProxyHandler {
    client: Client<HttpConnector, Body>,
    verifier: Arc<TokenVerifier>,
    deadline: UpstreamDeadline,
    max_response_bytes: usize,
}

impl ProxyHandler {
    pub fn new(
        verifier: Arc<TokenVerifier>,
        deadline: UpstreamDeadline,
        max_response_bytes: usize,
    ) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(deadline.connector());
        Self {
            client,
            verifier,
            deadline,
            max_response_bytes,
        }
    }

    /// Check the caller's token for `route`.
    ///
    /// Returns `None` for exempt routes, which are never inspected.
    pub fn authorize(
        &self,
        route: &RouteEntry,
        headers: &HeaderMap,
    ) -> Result<Option<VerifiedToken>, ProxyError> {
        if !route.requires_auth() {
            return Ok(None);
        }

        let token = bearer_token(headers)?;
        match self.verifier.verify(token) {
            Ok(verified) => Ok(Some(verified)),
            Err(e) => {
                tracing::debug!(service = %route.service(), error = %e, "Token rejected");
                Err(ProxyError::TokenInvalidOrExpired)
            }
        }
    }

    /// Authorize, forward and read back one request.
    ///
    /// No upstream call is made when authorization fails.
    pub async fn forward(
        &self,
        route: &RouteEntry,
        remainder: &str,
        request: Request<Body>,
    ) -> Result<UpstreamResponse, ProxyError> {
        if let Some(verified) = self.authorize(route, request.headers())? {
            tracing::debug!(
                service = %route.service(),
                subject = verified.subject.as_deref().unwrap_or("-"),
                "Token accepted"
            );
        }

        let upstream_request = upstream_request(route, remainder, request)?;
        tracing::debug!(
            method = %upstream_request.method(),
            upstream = %upstream_request.uri(),
            "Forwarding request"
        );

        let client = &self.client;
        let max_response_bytes = self.max_response_bytes;
        self.deadline
            .run(async move {
                let response: Response<Incoming> = client
                    .request(upstream_request)
                    .await
                    .map_err(ProxyError::UpstreamDialFailed)?;

                let (parts, body) = response.into_parts();
                let body = to_bytes(Body::new(body), max_response_bytes)
                    .await
                    .map_err(ProxyError::UpstreamResponseUnreadable)?;

                Ok::<_, ProxyError>(UpstreamResponse {
                    status: parts.status,
                    content_type: parts.headers.get(CONTENT_TYPE).cloned(),
                    body,
                })
            })
            .await
            .map_err(|_| ProxyError::UpstreamTimedOut(self.deadline.exchange()))?
    }
}

/// Build the upstream request from the inbound one.
///
/// The inbound body is moved, not copied, so it is streamed exactly once.
/// Every header is appended in order except `Host`, which the client derives
/// from the target.
pub fn upstream_request(
    route: &RouteEntry,
    remainder: &str,
    request: Request<Body>,
) -> Result<Request<Body>, ProxyError> {
    let (parts, body) = request.into_parts();
    let target = route.target(remainder, parts.uri.query());

    let mut builder = Request::builder().method(parts.method).uri(target);
    if let Some(headers) = builder.headers_mut() {
        for (name, value) in parts.headers.iter() {
            if *name == HOST {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
    }

    builder.body(body).map_err(ProxyError::UpstreamRequestInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::VerificationKey;
    use axum::http::{HeaderValue, Method};
    use std::time::Duration;
    use url::Url;

    const PUBLIC_PEM: &str = include_str!("../../tests/keys/test_public.pem");

    fn handler() -> ProxyHandler {
        let key = VerificationKey::from_pem(PUBLIC_PEM.as_bytes()).unwrap();
        ProxyHandler::new(
            Arc::new(TokenVerifier::new(key)),
            UpstreamDeadline::new(Duration::from_secs(1), Duration::from_secs(2)),
            1024,
        )
    }

    fn route(service: &str) -> RouteEntry {
        RouteEntry::for_service(service, &Url::parse("http://127.0.0.1:9/base/").unwrap())
    }

    #[test]
    fn test_upstream_request_preserves_everything() {
        let request = Request::builder()
            .method(Method::PATCH)
            .uri("http://gateway:8080/hotels/123/rooms?sort=asc")
            .header("host", "gateway:8080")
            .header("x-tag", "one")
            .header("x-tag", "two")
            .header("authorization", "Bearer:tok")
            .body(Body::from("payload"))
            .unwrap();

        let forwarded = upstream_request(&route("hotels"), "/123/rooms", request).unwrap();

        assert_eq!(forwarded.method(), Method::PATCH);
        assert_eq!(
            forwarded.uri().to_string(),
            "http://127.0.0.1:9/base/123/rooms?sort=asc"
        );
        assert!(forwarded.headers().get(HOST).is_none());
        let tags: Vec<_> = forwarded
            .headers()
            .get_all("x-tag")
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(tags, ["one", "two"]);
        assert_eq!(forwarded.headers()["authorization"], "Bearer:tok");
    }

    #[test]
    fn test_auth_route_is_never_inspected() {
        let handler = handler();
        let mut headers = HeaderMap::new();
        assert!(handler.authorize(&route("auth"), &headers).unwrap().is_none());

        headers.insert("authorization", HeaderValue::from_static("garbage"));
        assert!(handler.authorize(&route("auth"), &headers).unwrap().is_none());
    }

    #[test]
    fn test_protected_route_failures() {
        let handler = handler();
        let hotels = route("hotels");
        let mut headers = HeaderMap::new();

        assert!(matches!(
            handler.authorize(&hotels, &headers),
            Err(ProxyError::AuthHeaderMissing)
        ));

        headers.insert("authorization", HeaderValue::from_static("no-colon-here"));
        assert!(matches!(
            handler.authorize(&hotels, &headers),
            Err(ProxyError::AuthHeaderMalformed)
        ));

        headers.insert("authorization", HeaderValue::from_static("Bearer:abc.def.ghi"));
        assert!(matches!(
            handler.authorize(&hotels, &headers),
            Err(ProxyError::TokenInvalidOrExpired)
        ));
    }

    #[tokio::test]
    async fn test_forward_without_token_makes_no_call() {
        // Port 9 (discard) is never dialed: the request is rejected first.
        let request = Request::builder()
            .uri("/events/1")
            .body(Body::empty())
            .unwrap();
        let err = handler().forward(&route("events"), "/1", request).await.unwrap_err();
        assert!(matches!(err, ProxyError::AuthHeaderMissing));
    }
}

//! Relaying the upstream answer to the caller.
//!
//! Only the status code, `Content-Type` and the raw body bytes are relayed.
//! The body is fully buffered before anything is written back, so a broken
//! upstream stream turns into a clean 500 instead of a truncated reply.

use axum::{
    body::{Body, Bytes},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// A fully read upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        if let Some(content_type) = self.content_type {
            response.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_relays_verbatim() {
        let upstream = UpstreamResponse {
            status: StatusCode::IM_A_TEAPOT,
            content_type: Some(HeaderValue::from_static("application/vnd.test+json")),
            body: Bytes::from_static(b"\x00\x01{not json"),
        };

        let response = upstream.into_response();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/vnd.test+json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"\x00\x01{not json");
    }

    #[test]
    fn test_no_content_type() {
        let upstream = UpstreamResponse {
            status: StatusCode::NO_CONTENT,
            content_type: None,
            body: Bytes::new(),
        };
        let response = upstream.into_response();
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }
}

//! Request correlation ids.
//!
//! Each storefront request gets one id. It lands on the `request` span, so
//! every Storefront API call logged while serving the page carries it, and
//! on the Sentry scope. The response echoes it in `x-request-id` for support
//! to quote back.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id kept as-is.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// The id an upstream proxy assigned, if it looks like one.
fn upstream_id(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| is_token(id))
}

/// Non-empty, bounded, and limited to `[A-Za-z0-9._-]`.
fn is_token(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_UPSTREAM_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// Tag the request with the proxy's id, or a fresh UUID v4.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        upstream_id(&request).map_or_else(|| Uuid::new_v4().to_string(), str::to_string);

    Span::current().record("request_id", &request_id);
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn,
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { StatusCode::OK }))
            .layer(from_fn(request_id_middleware))
    }

    async fn echoed(header: Option<&str>) -> String {
        let mut request = Request::builder().uri("/");
        if let Some(id) = header {
            request = request.header(REQUEST_ID_HEADER, id);
        }
        let response = app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        response
            .headers()
            .get(REQUEST_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_keeps_proxy_request_id() {
        assert_eq!(echoed(Some("cf-8a1b2c3d.lax")).await, "cf-8a1b2c3d.lax");
    }

    #[tokio::test]
    async fn test_generates_uuid_without_usable_header() {
        for header in [None, Some(""), Some("order <script>"), Some("a b")] {
            let id = echoed(header).await;
            assert!(Uuid::parse_str(&id).is_ok(), "{header:?} gave {id}");
        }
    }

    #[test]
    fn test_overlong_ids_are_replaced() {
        assert!(is_token(&"a".repeat(MAX_UPSTREAM_ID_LEN)));
        assert!(!is_token(&"a".repeat(MAX_UPSTREAM_ID_LEN + 1)));
    }
}

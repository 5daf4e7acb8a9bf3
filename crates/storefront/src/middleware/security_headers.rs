//! Security headers for every response.
//!
//! The storefront loads images from the Shopify CDN, the launch sign-up form
//! from Klaviyo and fonts from Google Fonts. Inline scripts are allowed only
//! through the per-request nonce.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Build the `Content-Security-Policy` value for a nonce.
#[must_use]
pub fn content_security_policy(nonce: &str) -> String {
    format!(
        "default-src 'self'; \
         script-src 'self' 'nonce-{nonce}' https://cdn.shopify.com https://static.klaviyo.com \
         https://static-tracking.klaviyo.com https://cdn.judge.me https://cdnwidget.judge.me; \
         style-src 'self' 'unsafe-inline' https://fonts.googleapis.com https://static.klaviyo.com \
         https://cdn.judge.me; \
         font-src 'self' https://fonts.gstatic.com https://static.klaviyo.com; \
         img-src 'self' data: https://cdn.shopify.com https://*.klaviyo.com https://judge.me \
         https://judgeme.imgix.net; \
         connect-src 'self' https://*.klaviyo.com https://judge.me https://cache.judge.me; \
         frame-src https://*.klaviyo.com; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Content-Security-Policy` with the request's nonce
/// - `Permissions-Policy` denying device features
/// - `Cross-Origin-Opener-Policy: same-origin`
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let nonce = response
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.value().to_string())
        .unwrap_or_default();

    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if let Ok(value) = HeaderValue::from_str(&content_security_policy(&nonce)) {
        headers.insert(CONTENT_SECURITY_POLICY, value);
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(), \
             gyroscope=(), \
             interest-cohort=(), \
             magnetometer=(), \
             microphone=(), \
             payment=(), \
             usb=()",
        ),
    );

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_includes_nonce_and_no_unsafe_script() {
        let csp = content_security_policy("abc123==");
        assert!(csp.contains("script-src 'self' 'nonce-abc123=='"));
        assert!(!csp.contains("'unsafe-eval'"));
        let script_src = csp
            .split(';')
            .find(|d| d.trim_start().starts_with("script-src"))
            .unwrap_or_default();
        assert!(!script_src.contains("'unsafe-inline'"));
        assert!(csp.contains("https://fonts.googleapis.com"));
        assert!(csp.contains("frame-ancestors 'none'"));
    }
}

//! HTTP response building module

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_SECURITY_POLICY, CONTENT_TYPE};
use hyper::{Response, StatusCode};

use super::cache::CachePolicy;

/// Build the 200 response for a served asset
///
/// `csp` is only present for index and fallback responses with CSP enabled.
pub fn build_asset_response(
    body: Bytes,
    content_type: &str,
    cache: CachePolicy,
    csp: Option<&str>,
) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CACHE_CONTROL, cache.to_header_value())
        .header(CONTENT_LENGTH, body.len());

    if let Some(policy) = csp {
        builder = builder.header(CONTENT_SECURITY_POLICY, policy);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        build_500_response()
    })
}

/// Build an empty 500 response
pub fn build_500_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_response_headers() {
        let resp = build_asset_response(
            Bytes::from_static(b"body{}"),
            "text/css; charset=utf-8",
            CachePolicy::Immutable,
            None,
        );
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/css; charset=utf-8");
        assert_eq!(
            resp.headers()[CACHE_CONTROL],
            "public, max-age: 604800, immutable"
        );
        assert_eq!(resp.headers()[CONTENT_LENGTH], "6");
        assert!(resp.headers().get(CONTENT_SECURITY_POLICY).is_none());
    }

    #[test]
    fn test_asset_response_with_csp() {
        let resp = build_asset_response(
            Bytes::from_static(b"<html>"),
            "text/html; charset=utf-8",
            CachePolicy::Revalidate,
            Some("default-src 'self'"),
        );
        assert_eq!(resp.headers()[CONTENT_SECURITY_POLICY], "default-src 'self'");
        assert_eq!(resp.headers()[CACHE_CONTROL], "public, max-age: 60");
    }

    #[test]
    fn test_invalid_csp_value_yields_500() {
        let resp = build_asset_response(
            Bytes::from_static(b"<html>"),
            "text/html; charset=utf-8",
            CachePolicy::Revalidate,
            Some("default-src\n'self'"),
        );
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

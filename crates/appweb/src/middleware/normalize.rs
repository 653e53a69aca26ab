//! Trailing-slash canonicalization.
//!
//! A path with a trailing slash that matched no route is almost always the
//! canonical path spelled with an extra `/` (`/movies/` for `/movies`). Those
//! requests get a permanent redirect to the canonical form instead of a 404.

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{HeaderMap, Request, StatusCode, Uri, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

/// Whether an unmatched request path should be canonicalized.
pub fn needs_canonical_redirect(route_matched: bool, path: &str) -> bool {
    !route_matched && path.len() > 1 && path.ends_with('/')
}

/// Canonical absolute URL for `uri` with trailing slashes removed.
///
/// `root` is `scheme://host`. The query string is kept verbatim.
pub fn canonical_url(root: &str, uri: &Uri) -> String {
    let path = uri.path().trim_end_matches('/');
    match uri.query() {
        Some(query) => format!("{root}{path}?{query}"),
        None => format!("{root}{path}"),
    }
}

/// `scheme://host` of the request as seen by the client.
pub fn request_root(headers: &HeaderMap, uri: &Uri) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        // Proxy chains append their own scheme; the client's comes first.
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| uri.authority().map(|a| a.as_str()));

    match host {
        Some(host) => format!("{scheme}://{host}"),
        None => String::new(),
    }
}

/// Middleware redirecting unmatched trailing-slash paths (301).
///
/// Static asset requests are passed through untouched.
pub async fn canonicalize_trailing_slash(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if state.is_static_path(path) {
        return next.run(request).await;
    }

    let matched = request.extensions().get::<MatchedPath>().is_some();
    if !needs_canonical_redirect(matched, path) {
        return next.run(request).await;
    }

    let root = request_root(request.headers(), request.uri());
    let target = canonical_url(&root, request.uri());

    tracing::debug!(
        original = %request.uri(),
        target = %target,
        "redirecting to canonical url"
    );

    // HTTP header values must not contain \r or \n.
    let target: String = target
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect();

    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response()
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn trigger_condition() {
        assert!(needs_canonical_redirect(false, "/foo/"));
        assert!(needs_canonical_redirect(false, "//"));
        assert!(!needs_canonical_redirect(false, "/"));
        assert!(!needs_canonical_redirect(false, "/foo"));
        assert!(!needs_canonical_redirect(true, "/foo/"));
    }

    #[test]
    fn canonical_url_strips_trailing_slash() {
        let uri: Uri = "/foo/".parse().unwrap();
        assert_eq!(canonical_url("http://example.com", &uri), "http://example.com/foo");

        let uri: Uri = "/foo/bar//".parse().unwrap();
        assert_eq!(
            canonical_url("http://example.com", &uri),
            "http://example.com/foo/bar"
        );
    }

    #[test]
    fn canonical_url_keeps_query_verbatim() {
        let uri: Uri = "/search/?q=star%20wars&page=2".parse().unwrap();
        assert_eq!(
            canonical_url("https://example.com", &uri),
            "https://example.com/search?q=star%20wars&page=2"
        );
    }

    #[test]
    fn canonical_form_is_stable() {
        // Once canonical, the path no longer triggers normalization.
        let uri: Uri = "/foo/".parse().unwrap();
        let target: Uri = canonical_url("", &uri).parse().unwrap();
        assert_eq!(target.path(), "/foo");
        assert!(!needs_canonical_redirect(false, target.path()));
    }

    #[test]
    fn request_root_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));
        let uri: Uri = "/foo/".parse().unwrap();
        assert_eq!(request_root(&headers, &uri), "http://example.com");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(request_root(&headers, &uri), "https://example.com");
    }

    #[test]
    fn forwarded_proto_chain_uses_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static(" https , http"));
        let uri: Uri = "/foo/".parse().unwrap();
        assert_eq!(request_root(&headers, &uri), "https://example.com");

        headers.insert("x-forwarded-proto", HeaderValue::from_static(""));
        assert_eq!(request_root(&headers, &uri), "http://example.com");
    }

    #[test]
    fn request_root_without_host_is_relative() {
        let uri: Uri = "/foo/".parse().unwrap();
        assert_eq!(request_root(&HeaderMap::new(), &uri), "");

        let uri: Uri = "http://example.org/foo/".parse().unwrap();
        assert_eq!(request_root(&HeaderMap::new(), &uri), "http://example.org");
    }
}

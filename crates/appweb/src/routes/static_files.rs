//! Static file serving.

use axum::{
    Router,
    extract::{Path, RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::fs;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Cache lifetime for unversioned assets (1 day).
const CACHE_CONTROL_DEFAULT: &str = "public, max-age=86400";

/// Cache lifetime for revision-versioned assets (`?v=...`).
const CACHE_CONTROL_VERSIONED: &str = "public, max-age=31536000, immutable";

/// Create the static files router mounted at `static_url_path`.
pub fn router(static_url_path: &str) -> Router<AppState> {
    let route = format!("{}/{{*path}}", static_url_path.trim_end_matches('/'));
    Router::new().route(&route, get(serve_static))
}

/// Serve a static file.
async fn serve_static(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    // Security: prevent path traversal
    let path = path.trim_start_matches('/');
    if path.contains("..") || path.contains('\0') {
        return AppError::NotFound.into_response();
    }

    let file_path = state.static_dir().join(path);

    let content = match fs::read(&file_path).await {
        Ok(content) => content,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %file_path.display(), error = %e, "failed to read static file");
            }
            return AppError::NotFound.into_response();
        }
    };

    let cache_control = if is_versioned(query.as_deref()) {
        CACHE_CONTROL_VERSIONED
    } else {
        CACHE_CONTROL_DEFAULT
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime_from_path(&file_path)),
            (header::CACHE_CONTROL, cache_control),
        ],
        content,
    )
        .into_response()
}

/// Whether the query string carries an asset version (`v=`).
fn is_versioned(query: Option<&str>) -> bool {
    query.is_some_and(|q| q.split('&').any(|pair| pair.starts_with("v=")))
}

fn mime_from_path(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js") => "application/javascript",
        Some("css") => "text/css",
        Some("html") => "text/html",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}

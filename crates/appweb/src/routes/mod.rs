//! HTTP route handlers and application router assembly.

pub mod extras;
pub mod files;
pub mod health;
pub mod static_files;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppMode;
use crate::error::AppError;
use crate::middleware::{canonicalize_trailing_slash, render_error_pages, resolve_locale};
use crate::state::AppState;
use crate::urls::UrlMap;

/// Endpoint of the static file route.
pub const STATIC_ENDPOINT: &str = "static";

/// Endpoint registry for the blueprint selected by `mode`.
pub fn url_map(mode: Option<AppMode>, static_url_path: &str) -> UrlMap {
    let mut urls = UrlMap::new();
    urls.register(
        STATIC_ENDPOINT,
        &format!("{}/{{*filename}}", static_url_path.trim_end_matches('/')),
    );

    let endpoints: &[(&str, &str)] = match mode {
        Some(AppMode::Search) => files::ENDPOINTS,
        Some(AppMode::Extras) => extras::ENDPOINTS,
        None => &[],
    };
    for (endpoint, pattern) in endpoints {
        urls.register(endpoint, pattern);
    }

    urls
}

/// Build the full application router.
///
/// Middleware layers (last added = first executed in request flow):
/// TraceLayer → response headers → error pages → trailing slash → locale → routes
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(health::router())
        .merge(static_files::router(state.static_url_path()));

    router = match state.mode() {
        Some(AppMode::Search) => router.merge(files::router()),
        Some(AppMode::Extras) => router.merge(extras::router()),
        None => router,
    };

    router
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            resolve_locale,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            canonicalize_trailing_slash,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            render_error_pages,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-ua-compatible"),
            HeaderValue::from_static("IE=edge"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}

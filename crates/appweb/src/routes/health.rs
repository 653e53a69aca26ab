//! Health check endpoint.
//!
//! Reports the serving mode and the deployed revision so load balancers and
//! deploy tooling can confirm which build answered.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    mode: Option<&'static str>,
    revision: Option<String>,
    manifest_records: usize,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let revision = state.revision();
    Json(HealthResponse {
        status: "healthy",
        mode: state.mode().map(|m| m.as_str()),
        revision: revision.fingerprint().map(ToString::to_string),
        manifest_records: revision.manifest().len(),
    })
}

/// Create the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

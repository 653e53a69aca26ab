#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Revision fingerprint: health report, asset versioning and static caching.

mod common;

use axum::http::StatusCode;

use appweb::revision::RevisionFingerprint;
use appweb_test_utils::{assert, revision_manifest};
use common::{MANIFEST_RECORDS, TestApp, body_string, header_str};

fn expected_fingerprint() -> String {
    RevisionFingerprint::of(revision_manifest(MANIFEST_RECORDS).as_bytes()).to_string()
}

#[tokio::test]
async fn health_reports_revision() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["mode"], "search");
    assert_eq!(json["revision"], expected_fingerprint());
    assert_eq!(json["manifest_records"], 2);
}

#[tokio::test]
async fn missing_manifest_disables_versioning() {
    let app = TestApp::builder().without_manifest().build().await;

    let json: serde_json::Value =
        serde_json::from_str(&body_string(app.get("/health").await).await).unwrap();
    assert!(json["revision"].is_null());
    assert_eq!(json["manifest_records"], 0);

    let body = body_string(app.get("/en").await).await;
    assert::contains(&body, r#"href="/static/css/torrents.css""#);
    assert::not_contains(&body, "?v=");
}

#[tokio::test]
async fn asset_urls_carry_fingerprint() {
    let app = TestApp::new().await;

    let body = body_string(app.get("/en").await).await;
    assert::contains(
        &body,
        &format!("/static/css/torrents.css?v={}", expected_fingerprint()),
    );
}

#[tokio::test]
async fn cache_namespace_ends_with_fingerprint() {
    let app = TestApp::new().await;
    assert_eq!(
        app.state.cache().prefix(),
        format!("{}/", expected_fingerprint())
    );
}

#[tokio::test]
async fn manifest_is_read_only_at_startup() {
    let app = TestApp::new().await;
    std::fs::write(app.revision_path(), "changed 1\n").unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&body_string(app.get("/health").await).await).unwrap();
    assert_eq!(json["revision"], expected_fingerprint());
}

#[tokio::test]
async fn versioned_static_assets_are_immutable() {
    let app = TestApp::new().await;

    let response = app
        .get(&format!(
            "/static/css/torrents.css?v={}",
            expected_fingerprint()
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "content-type"), Some("text/css"));
    assert_eq!(
        header_str(&response, "cache-control"),
        Some("public, max-age=31536000, immutable")
    );
    assert_eq!(body_string(response).await, "body { margin: 0; }\n");
}

#[tokio::test]
async fn unversioned_static_assets_use_short_cache() {
    let app = TestApp::new().await;

    let response = app.get("/static/css/torrents.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, "cache-control"),
        Some("public, max-age=86400")
    );
}

#[tokio::test]
async fn static_paths_are_not_canonicalized() {
    let app = TestApp::new().await;

    let response = app.get("/static/css/").await;
    assert_ne!(response.status(), StatusCode::MOVED_PERMANENTLY);
}

#[tokio::test]
async fn missing_static_asset_is_not_found() {
    let app = TestApp::new().await;

    assert_eq!(
        app.get("/static/css/missing.css").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/static/../revision").await.status(),
        StatusCode::NOT_FOUND
    );
}

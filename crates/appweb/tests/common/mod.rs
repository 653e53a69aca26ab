#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Every [`TestApp`] owns a temporary deployment root holding the revision
//! manifest, static files and file records, and runs the real router built
//! by `appweb::routes::app` against it. Templates come from the crate's
//! `templates/` directory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use appweb::config::AppMode;
use appweb::{AppState, Config, routes};
use appweb_test_utils::{TestFile, revision_manifest};

/// Manifest written by [`TestApp::new`].
pub const MANIFEST_RECORDS: &[&str] = &["appweb 4f2a1c", "searchd 99b0 # search tier"];

/// Test application wrapper using the real routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub root: TempDir,
}

impl TestApp {
    /// Search-mode app with a revision manifest and one stylesheet.
    pub async fn new() -> Self {
        Self::builder().build().await
    }

    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            root: TempDir::new().expect("Failed to create temp dir"),
            mode: Some(AppMode::Search),
            manifest: Some(revision_manifest(MANIFEST_RECORDS)),
            static_prefix: None,
            files: Vec::new(),
            raw_files: Vec::new(),
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// GET `uri` with a `Host` header.
    pub async fn get(&self, uri: &str) -> Response {
        self.get_from_host(uri, "example.com").await
    }

    pub async fn get_from_host(&self, uri: &str, host: &str) -> Response {
        self.request(
            Request::builder()
                .uri(uri)
                .header(header::HOST, host)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Path of the revision manifest inside the deployment root.
    pub fn revision_path(&self) -> PathBuf {
        self.root.path().join("revision")
    }
}

/// Builder for apps that need non-default fixtures.
pub struct TestAppBuilder {
    root: TempDir,
    mode: Option<AppMode>,
    manifest: Option<String>,
    static_prefix: Option<String>,
    files: Vec<TestFile>,
    raw_files: Vec<(String, String)>,
}

impl TestAppBuilder {
    pub fn mode(mut self, mode: Option<AppMode>) -> Self {
        self.mode = mode;
        self
    }

    /// Start without a revision manifest.
    pub fn without_manifest(mut self) -> Self {
        self.manifest = None;
        self
    }

    pub fn static_prefix(mut self, prefix: &str) -> Self {
        self.static_prefix = Some(prefix.to_string());
        self
    }

    pub fn file(mut self, file: TestFile) -> Self {
        self.files.push(file);
        self
    }

    /// Store `contents` verbatim as the record for `id`.
    pub fn raw_file(mut self, id: &str, contents: &str) -> Self {
        self.raw_files.push((id.to_string(), contents.to_string()));
        self
    }

    pub async fn build(self) -> TestApp {
        let root = self.root.path();
        let mut config = Config::with_root(root);
        config.mode = self.mode;
        config.static_prefix = self.static_prefix;
        config.templates_dir = templates_dir();

        if let Some(manifest) = &self.manifest {
            std::fs::write(&config.revision_file, manifest).unwrap();
        }

        write_static(&config.static_dir);

        std::fs::create_dir_all(&config.files_dir).unwrap();
        for file in &self.files {
            file.write_to(&config.files_dir).unwrap();
        }
        for (id, contents) in &self.raw_files {
            std::fs::write(config.files_dir.join(format!("{id}.json")), contents).unwrap();
        }

        let state = AppState::new(&config)
            .await
            .expect("Failed to initialize AppState");
        let router = routes::app(state.clone());

        TestApp {
            router,
            state,
            root: self.root,
        }
    }
}

/// The crate's own templates directory.
pub fn templates_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    Path::new(&manifest_dir).join("templates")
}

fn write_static(static_dir: &Path) {
    let css_dir = static_dir.join("css");
    std::fs::create_dir_all(&css_dir).unwrap();
    std::fs::write(css_dir.join("torrents.css"), "body { margin: 0; }\n").unwrap();
}

/// Collect a response body as a string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Value of header `name`, if present and textual.
pub fn header_str<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

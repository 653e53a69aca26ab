//! Application state shared across all handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::cache::CacheLayer;
use crate::category::{
    CategoryRemapper, CategoryTable, FallbackTypeTable, FileRenderer, SnapshotRenderer,
};
use crate::config::{AppMode, Config};
use crate::revision::Revision;
use crate::routes;
use crate::store::{FileStore, JsonDirFileStore};
use crate::theme::ThemeEngine;
use crate::urls::UrlMap;

/// Footer links and analytics settings exposed to every page.
#[derive(Debug, Clone, Default)]
pub struct SiteLinks {
    pub tos_link: String,
    pub privacy_link: String,
    pub analytics_account: Option<String>,
}

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap. Everything in here is built
/// once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Blueprint mode; `None` when unconfigured.
    mode: Option<AppMode>,

    /// Endpoint of the landing page.
    home_route: &'static str,

    /// Deployed revision manifest and fingerprint.
    revision: Arc<Revision>,

    /// Page cache, namespaced by the revision-qualified prefix.
    cache: CacheLayer,

    /// Category table shared with every request context.
    categories: Arc<CategoryTable>,

    /// Named endpoints for outbound links.
    urls: UrlMap,

    /// Theme engine for template rendering.
    theme: Arc<ThemeEngine>,

    /// File record source.
    files: Arc<dyn FileStore>,

    /// Renderer applied to file records before the detail view.
    file_renderer: Arc<dyn FileRenderer>,

    /// Local static URL path (e.g. `/static`).
    static_url_path: String,

    /// CDN prefix for static assets on non-beta hosts.
    static_prefix: Option<String>,

    /// Directory served under `static_url_path`.
    static_dir: PathBuf,

    site: SiteLinks,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Reads the revision manifest and loads templates; both happen exactly
    /// once per process.
    pub async fn new(config: &Config) -> Result<Self> {
        let revision = Arc::new(
            Revision::load(&config.revision_file)
                .await
                .context("failed to load revision manifest")?,
        );

        let cache_key_prefix = revision.cache_key_prefix(&config.cache_key_prefix);
        info!(
            revision = ?revision.fingerprint().map(|f| f.as_str()),
            records = revision.manifest().len(),
            cache_key_prefix = %cache_key_prefix,
            "revision loaded"
        );

        let theme = ThemeEngine::new(&config.templates_dir, Arc::clone(&revision))
            .context("failed to load templates")?;

        let categories = Arc::new(CategoryTable::default());
        let fallbacks = Arc::new(FallbackTypeTable::default());

        let file_renderer = CategoryRemapper::new(
            SnapshotRenderer,
            Arc::clone(&categories),
            fallbacks,
            config.image_server.clone(),
        );

        let home_route = match config.mode {
            Some(mode) => mode.home_route(),
            None => {
                error!("APPWEB_MODE not set, no blueprint registered");
                AppMode::Search.home_route()
            }
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                mode: config.mode,
                home_route,
                revision,
                cache: CacheLayer::new(cache_key_prefix, config.cache_ttl_secs),
                categories,
                urls: routes::url_map(config.mode, &config.static_url_path),
                theme: Arc::new(theme),
                files: Arc::new(JsonDirFileStore::new(config.files_dir.clone())),
                file_renderer: Arc::new(file_renderer),
                static_url_path: config.static_url_path.clone(),
                static_prefix: config.static_prefix.clone(),
                static_dir: config.static_dir.clone(),
                site: SiteLinks {
                    tos_link: config.tos_link.clone(),
                    privacy_link: config.privacy_link.clone(),
                    analytics_account: config.analytics_account.clone(),
                },
            }),
        })
    }

    /// Get the blueprint mode.
    pub fn mode(&self) -> Option<AppMode> {
        self.inner.mode
    }

    /// Get the landing page endpoint.
    pub fn home_route(&self) -> &'static str {
        self.inner.home_route
    }

    /// Get the deployed revision.
    pub fn revision(&self) -> &Arc<Revision> {
        &self.inner.revision
    }

    /// Get the page cache.
    pub fn cache(&self) -> &CacheLayer {
        &self.inner.cache
    }

    /// Get the category table.
    pub fn categories(&self) -> &Arc<CategoryTable> {
        &self.inner.categories
    }

    /// Get the endpoint registry.
    pub fn urls(&self) -> &UrlMap {
        &self.inner.urls
    }

    /// Get the theme engine.
    pub fn theme(&self) -> &Arc<ThemeEngine> {
        &self.inner.theme
    }

    /// Get the file record store.
    pub fn files(&self) -> &Arc<dyn FileStore> {
        &self.inner.files
    }

    /// Get the file renderer.
    pub fn file_renderer(&self) -> &Arc<dyn FileRenderer> {
        &self.inner.file_renderer
    }

    pub fn static_url_path(&self) -> &str {
        &self.inner.static_url_path
    }

    pub fn static_prefix(&self) -> Option<&str> {
        self.inner.static_prefix.as_deref()
    }

    pub fn static_dir(&self) -> &Path {
        &self.inner.static_dir
    }

    /// Whether `path` is served by the static file handler.
    pub fn is_static_path(&self, path: &str) -> bool {
        path.strip_prefix(self.static_url_path())
            .is_some_and(|rest| rest.starts_with('/'))
    }

    pub fn site(&self) -> &SiteLinks {
        &self.inner.site
    }
}

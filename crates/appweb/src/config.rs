//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

use crate::category::DEFAULT_IMAGE_SERVER;

/// Which blueprint this instance serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// File search front end (`files` blueprint).
    Search,
    /// Auxiliary pages (`extras` blueprint).
    Extras,
}

impl AppMode {
    /// Endpoint of the landing page for this mode.
    pub fn home_route(self) -> &'static str {
        match self {
            AppMode::Search => "files.home",
            AppMode::Extras => "extras.home",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AppMode::Search => "search",
            AppMode::Extras => "extras",
        }
    }
}

impl FromStr for AppMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "search" => Ok(AppMode::Search),
            "extras" => Ok(AppMode::Extras),
            other => bail!("unknown APPWEB_MODE '{other}' (expected 'search' or 'extras')"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Blueprint mode. `None` when APPWEB_MODE is unset.
    pub mode: Option<AppMode>,

    /// Verbose logging default (default: false).
    pub debug: bool,

    /// Path to the deployment revision manifest (default: ./revision).
    pub revision_file: PathBuf,

    /// Cache namespace that the revision fingerprint is appended to.
    pub cache_key_prefix: String,

    /// TTL of the in-process page cache in seconds (default: 60).
    pub cache_ttl_secs: u64,

    /// Local URL path for static files (default: /static).
    pub static_url_path: String,

    /// CDN prefix for static assets on non-beta hosts.
    pub static_prefix: Option<String>,

    /// Directory served under `static_url_path` (default: ./static).
    pub static_dir: PathBuf,

    /// Tera templates directory (default: ./templates).
    pub templates_dir: PathBuf,

    /// Directory of JSON file records (default: ./files).
    pub files_dir: PathBuf,

    /// Media host stamped on remapped file records.
    pub image_server: String,

    /// Terms of service link shown in page footers.
    pub tos_link: String,

    /// Privacy policy link shown in page footers.
    pub privacy_link: String,

    /// Analytics account id exposed to templates.
    pub analytics_account: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let mode = env::var("APPWEB_MODE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.parse::<AppMode>())
            .transpose()?;

        let debug = env::var("DEBUG")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let revision_file = env::var("REVISION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./revision"));

        let cache_key_prefix = env::var("CACHE_KEY_PREFIX").unwrap_or_default();

        let cache_ttl_secs = env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("CACHE_TTL_SECS must be a valid u64")?;

        let static_url_path = env::var("STATIC_URL_PATH")
            .map(|v| format!("/{}", v.trim_matches('/')))
            .unwrap_or_else(|_| "/static".to_string());

        let static_prefix = env::var("STATIC_PREFIX").ok().filter(|v| !v.is_empty());

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./static"));

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./templates"));

        let files_dir = env::var("FILES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./files"));

        let image_server =
            env::var("IMAGE_SERVER").unwrap_or_else(|_| DEFAULT_IMAGE_SERVER.to_string());

        let tos_link = env::var("TOS_LINK").unwrap_or_default();
        let privacy_link = env::var("PRIVACY_LINK").unwrap_or_default();
        let analytics_account = env::var("ANALYTICS_ACCOUNT").ok().filter(|v| !v.is_empty());

        Ok(Self {
            port,
            mode,
            debug,
            revision_file,
            cache_key_prefix,
            cache_ttl_secs,
            static_url_path,
            static_prefix,
            static_dir,
            templates_dir,
            files_dir,
            image_server,
            tos_link,
            privacy_link,
            analytics_account,
        })
    }

    /// Defaults for every field, with paths relative to `root`.
    ///
    /// Used by tests and tools that build state without touching the process
    /// environment.
    pub fn with_root(root: &std::path::Path) -> Self {
        Self {
            port: 3000,
            mode: Some(AppMode::Search),
            debug: false,
            revision_file: root.join("revision"),
            cache_key_prefix: String::new(),
            cache_ttl_secs: 60,
            static_url_path: "/static".to_string(),
            static_prefix: None,
            static_dir: root.join("static"),
            templates_dir: root.join("templates"),
            files_dir: root.join("files"),
            image_server: DEFAULT_IMAGE_SERVER.to_string(),
            tos_link: String::new(),
            privacy_link: String::new(),
            analytics_account: None,
        }
    }
}

//! Theme engine with Tera templates and suggestion resolution.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tera::{Tera, Value};
use tracing::debug;

use crate::revision::Revision;

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    /// Tera template engine instance.
    tera: Tera,
    /// Cache mapping suggestion lists to resolved template names.
    suggestion_cache: DashMap<String, String>,
}

/// `asset_url(path=..., prefix=...)`: versioned static asset URL.
struct AssetUrl {
    revision: Arc<Revision>,
}

impl tera::Function for AssetUrl {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let path = args
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("asset_url requires a string `path` argument"))?;
        let prefix = args
            .get("prefix")
            .and_then(Value::as_str)
            .unwrap_or("/static");
        Ok(Value::String(self.revision.asset_url(prefix, path)))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

impl ThemeEngine {
    /// Create a new theme engine loading templates from the given directory.
    pub fn new(template_dir: &Path, revision: Arc<Revision>) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;
        Self::register_helpers(&mut tera, revision);

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), "loaded templates");

        Ok(Self {
            tera,
            suggestion_cache: DashMap::new(),
        })
    }

    /// Create a theme engine with no templates (for testing).
    pub fn empty(revision: Arc<Revision>) -> Self {
        let mut tera = Tera::default();
        Self::register_helpers(&mut tera, revision);
        Self {
            tera,
            suggestion_cache: DashMap::new(),
        }
    }

    /// Register custom Tera functions and filters.
    fn register_helpers(tera: &mut Tera, revision: Arc<Revision>) {
        tera.register_function("asset_url", AssetUrl { revision });

        // Human readable byte counts
        tera.register_filter(
            "filesize",
            |value: &Value, _args: &HashMap<String, Value>| {
                let Some(bytes) = value.as_u64() else {
                    return Ok(Value::String(String::new()));
                };
                Ok(Value::String(human_size(bytes)))
            },
        );
    }

    /// Resolve the best template from a list of suggestions.
    ///
    /// Templates are tried in order; the first one that exists is returned.
    /// Results are cached for performance.
    ///
    /// Example suggestions: `["errors/404", "error"]`
    pub fn resolve_template(&self, suggestions: &[&str]) -> Option<String> {
        if suggestions.is_empty() {
            return None;
        }

        let cache_key = suggestions.join("|");
        if let Some(cached) = self.suggestion_cache.get(&cache_key) {
            return Some(cached.clone());
        }

        for suggestion in suggestions {
            let template_name = format!("{suggestion}.html");
            if self.tera.get_template(&template_name).is_ok() {
                self.suggestion_cache
                    .insert(cache_key, template_name.clone());
                return Some(template_name);
            }

            // Also try without .html extension (in case suggestion already has it)
            if self.tera.get_template(suggestion).is_ok() {
                let name = (*suggestion).to_string();
                self.suggestion_cache.insert(cache_key, name.clone());
                return Some(name);
            }
        }

        // Don't cache negative results to allow hot-reload
        None
    }

    /// Error template suggestions, most specific first.
    pub fn error_suggestions(code: u16) -> Vec<String> {
        vec![format!("errors/{code}"), "error".to_string()]
    }

    /// Render a named template.
    pub fn render(&self, template: &str, context: &tera::Context) -> tera::Result<String> {
        self.tera.render(template, context)
    }
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("template_count", &self.tera.get_template_names().count())
            .field("cache_size", &self.suggestion_cache.len())
            .finish()
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn engine_with(revision: Revision, name: &str, source: &str) -> ThemeEngine {
        let mut engine = ThemeEngine::empty(Arc::new(revision));
        engine.tera.add_raw_template(name, source).unwrap();
        engine
    }

    #[test]
    fn test_error_suggestions() {
        assert_eq!(
            ThemeEngine::error_suggestions(404),
            vec!["errors/404", "error"]
        );
    }

    #[test]
    fn test_resolve_template_prefers_specific() {
        let mut engine = ThemeEngine::empty(Arc::new(Revision::default()));
        engine
            .tera
            .add_raw_templates(vec![("error.html", "generic"), ("errors/404.html", "missing")])
            .unwrap();

        assert_eq!(
            engine.resolve_template(&["errors/404", "error"]).as_deref(),
            Some("errors/404.html")
        );
        assert_eq!(
            engine.resolve_template(&["errors/500", "error"]).as_deref(),
            Some("error.html")
        );
        assert!(engine.resolve_template(&["nonexistent"]).is_none());
    }

    #[test]
    fn test_asset_url_function_versions_urls() {
        let revision = Revision::from_bytes(b"appweb 1");
        let fingerprint = revision.fingerprint().unwrap().to_string();
        let engine = engine_with(
            revision,
            "t",
            r#"{{ asset_url(path="gen/appweb.js", prefix=prefix) }}"#,
        );

        let mut ctx = tera::Context::new();
        ctx.insert("prefix", "//cdn.example.com");
        assert_eq!(
            engine.render("t", &ctx).unwrap(),
            format!("//cdn.example.com/gen/appweb.js?v={fingerprint}")
        );
    }

    #[test]
    fn test_asset_url_function_without_revision() {
        let engine = engine_with(Revision::default(), "t", r#"{{ asset_url(path="a.css") }}"#);
        assert_eq!(
            engine.render("t", &tera::Context::new()).unwrap(),
            "/static/a.css"
        );
    }

    #[test]
    fn test_filesize_filter() {
        let engine = engine_with(Revision::default(), "t", "{{ n | filesize }}");
        let mut ctx = tera::Context::new();
        ctx.insert("n", &1_572_864_u64);
        assert_eq!(engine.render("t", &ctx).unwrap(), "1.5 MB");

        ctx.insert("n", &512_u64);
        assert_eq!(engine.render("t", &ctx).unwrap(), "512 B");

        ctx.insert("n", "not a number");
        assert_eq!(engine.render("t", &ctx).unwrap(), "");
    }
}

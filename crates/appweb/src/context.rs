//! Per-request presentation context.
//!
//! Built at the start of every non-asset request (and again for error pages)
//! and stored in the request extensions. Templates receive its fields through
//! [`RequestContext::inject`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::http::{HeaderMap, header};
use serde::Serialize;
use tracing::debug;

use crate::bots::is_search_bot_request;
use crate::category::CategoryTable;
use crate::state::AppState;

/// License name shown in page branding.
const LICENSE_NAME: &str = "torrents";

/// Request-scoped values shared by handlers and templates.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    /// Active locale code.
    pub lang: String,

    /// The client identified itself as a search engine crawler.
    pub search_bot: bool,

    /// The request came through a `beta.` host.
    pub beta_request: bool,

    /// Prefix for static asset URLs.
    pub static_prefix: String,

    /// Endpoint of the landing page.
    pub home_route: &'static str,

    /// Landing page URL in the active locale.
    pub home_url: String,

    pub categories: Arc<CategoryTable>,

    /// Search keywords collected while handling the request.
    pub keywords: BTreeSet<String>,

    /// Search arguments collected while handling the request.
    pub args: BTreeMap<String, String>,

    pub title: String,
    pub page_description: String,

    pub license_name: &'static str,
    pub tos_link: String,
    pub privacy_link: String,
    pub analytics_account: Option<String>,
}

impl RequestContext {
    /// Build the context for a request in locale `lang`.
    pub fn init(state: &AppState, lang: impl Into<String>, headers: &HeaderMap) -> Self {
        let lang = lang.into();
        let beta_request = is_beta_host(headers);

        let static_prefix = if beta_request {
            state.static_url_path().to_string()
        } else {
            state
                .static_prefix()
                .unwrap_or_else(|| state.static_url_path())
                .to_string()
        };

        let home_route = state.home_route();
        let home_url = match state.urls().url_for(home_route, BTreeMap::new(), &lang) {
            Ok(url) => url,
            Err(e) => {
                debug!(error = %e, home_route, "home route not registered, linking to /");
                "/".to_string()
            }
        };

        let site = state.site();

        Self {
            lang,
            search_bot: is_search_bot_request(headers),
            beta_request,
            static_prefix,
            home_route,
            home_url,
            categories: Arc::clone(state.categories()),
            keywords: BTreeSet::new(),
            args: BTreeMap::new(),
            title: String::new(),
            page_description: String::new(),
            license_name: LICENSE_NAME,
            tos_link: site.tos_link.clone(),
            privacy_link: site.privacy_link.clone(),
            analytics_account: site.analytics_account.clone(),
        }
    }

    /// Insert every field as a top-level template variable.
    pub fn inject(&self, context: &mut tera::Context) {
        context.insert("lang", &self.lang);
        context.insert("search_bot", &self.search_bot);
        context.insert("beta_request", &self.beta_request);
        context.insert("static_prefix", &self.static_prefix);
        context.insert("home_route", &self.home_route);
        context.insert("home_url", &self.home_url);
        context.insert("categories", self.categories.as_ref());
        context.insert("keywords", &self.keywords);
        context.insert("args", &self.args);
        context.insert("title", &self.title);
        context.insert("page_description", &self.page_description);
        context.insert("license_name", &self.license_name);
        context.insert("tos_link", &self.tos_link);
        context.insert("privacy_link", &self.privacy_link);
        context.insert("analytics_account", &self.analytics_account);
    }

    /// Template context pre-filled with this request's fields.
    pub fn to_tera(&self) -> tera::Context {
        let mut context = tera::Context::new();
        self.inject(&mut context);
        context
    }
}

/// Whether the request host is a pre-production `beta.` host.
pub fn is_beta_host(headers: &HeaderMap) -> bool {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|host| host.starts_with("beta."))
}

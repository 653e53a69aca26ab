//! Locale resolution middleware.
//!
//! Routed URLs carry the locale as their `{lang}` capture. The middleware
//! pops it from the captured values, records it as the active locale and
//! builds the per-request [`RequestContext`]. Handlers read the remaining
//! captures from [`RouteValues`], so `lang` never reaches them as an ordinary
//! parameter.

use std::collections::BTreeMap;

use axum::{
    body::Body,
    extract::{MatchedPath, RawPathParams, State, rejection::RawPathParamsRejection},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::context::RequestContext;
use crate::state::AppState;
use crate::urls::LANG_PARAM;

/// Locale used when the URL does not provide one.
pub const DEFAULT_LOCALE: &str = "en";

/// Route captures left after the locale was removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteValues(BTreeMap<String, String>);

impl RouteValues {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self(values)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Pop the locale out of the route captures.
///
/// `None` means no route matched; both that and a route without a `lang`
/// capture resolve to [`DEFAULT_LOCALE`].
pub fn pull_lang_code(values: Option<&mut BTreeMap<String, String>>) -> String {
    values
        .and_then(|values| values.remove(LANG_PARAM))
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

/// Locale for error pages, which may be produced before routing ran.
///
/// Takes the two characters after the leading slash when the path has at
/// least three characters, otherwise the default.
pub fn error_locale(path: &str) -> String {
    if path.chars().count() > 2 {
        path.chars().skip(1).take(2).collect()
    } else {
        DEFAULT_LOCALE.to_string()
    }
}

/// Middleware resolving the active locale and building the request context.
///
/// Static asset requests are passed through untouched.
pub async fn resolve_locale(
    State(state): State<AppState>,
    params: Result<RawPathParams, RawPathParamsRejection>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if state.is_static_path(request.uri().path()) {
        return next.run(request).await;
    }

    let matched = request.extensions().get::<MatchedPath>().is_some();
    let mut values: Option<BTreeMap<String, String>> = match (matched, params) {
        (true, Ok(params)) => Some(
            params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ),
        (true, Err(_)) => Some(BTreeMap::new()),
        (false, _) => None,
    };

    let lang = pull_lang_code(values.as_mut());
    tracing::debug!(
        path = %request.uri().path(),
        lang = %lang,
        matched,
        "resolved request locale"
    );

    let context = RequestContext::init(&state, lang, request.headers());

    let extensions = request.extensions_mut();
    extensions.insert(RouteValues::new(values.unwrap_or_default()));
    extensions.insert(context);

    next.run(request).await
}

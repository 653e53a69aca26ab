//! `files` blueprint: landing page and file detail view.

use axum::{
    Extension, Router,
    extract::State,
    response::{Html, Redirect},
    routing::get,
};
use tracing::{debug, warn};

use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::middleware::RouteValues;
use crate::state::AppState;
use crate::store::StoreError;

/// Endpoints of this blueprint, as `(endpoint, pattern)`.
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("files.home", "/{lang}"),
    ("files.download", "/{lang}/download/{file_id}"),
];

/// Create the files router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/{lang}", get(home))
        .route("/{lang}/download/{file_id}", get(download))
}

/// `/` sends visitors to the landing page in the default locale.
async fn root(Extension(ctx): Extension<RequestContext>) -> Redirect {
    Redirect::to(&ctx.home_url)
}

/// Landing page with the category list.
async fn home(
    State(state): State<AppState>,
    Extension(mut ctx): Extension<RequestContext>,
) -> AppResult<Html<String>> {
    ctx.title = "Search files".to_string();
    let context = ctx.to_tera();
    let html = state.theme().render("home.html", &context)?;
    Ok(Html(html))
}

/// Cache key for a rendered file page.
///
/// Every context field that changes the markup is part of the key.
fn page_cache_key(ctx: &RequestContext, file_id: &str) -> String {
    format!(
        "file:{}:{}:{}:{}",
        ctx.lang,
        if ctx.beta_request { "beta" } else { "live" },
        if ctx.search_bot { "bot" } else { "human" },
        file_id
    )
}

/// File detail view.
///
/// The record goes through the category remapping renderer; the template
/// receives the rendered payload as `file` and the remapped display category
/// read back from the record.
async fn download(
    State(state): State<AppState>,
    Extension(mut ctx): Extension<RequestContext>,
    Extension(values): Extension<RouteValues>,
) -> AppResult<Html<String>> {
    let file_id = values.get("file_id").ok_or(AppError::NotFound)?;

    let cache_key = page_cache_key(&ctx, file_id);
    if let Some(html) = state.cache().get(&cache_key).await {
        return Ok(Html(html));
    }

    let mut record = match state.files().get(file_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            debug!(file_id = %file_id, "file not found");
            return Err(AppError::NotFound);
        }
        Err(e @ StoreError::Io { .. }) => {
            warn!(file_id = %file_id, error = %e, "file store unavailable");
            return Err(AppError::Unavailable);
        }
        Err(e) => return Err(e.into()),
    };

    if record.removed {
        debug!(file_id = %file_id, "file removed");
        return Err(AppError::Gone);
    }

    let payload = state.file_renderer().render(&mut record);

    if let Some(title) = payload.view.extra.get("title").and_then(|v| v.as_str()) {
        ctx.title = title.to_string();
    }
    if let Some(tags) = &payload.view.tags {
        ctx.keywords.extend(tags.iter().cloned());
    }

    let mut context = ctx.to_tera();
    context.insert("file_id", file_id);
    context.insert("file", &payload);
    context.insert("category", &record.view.file_type);
    context.insert("image_server", &record.view.first_image_server);

    let html = state.theme().render("file.html", &context)?;
    state.cache().set(&cache_key, &html).await;

    Ok(Html(html))
}

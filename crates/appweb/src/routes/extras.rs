//! `extras` blueprint: auxiliary landing page.

use axum::{
    Extension, Router,
    extract::State,
    response::{Html, Redirect},
    routing::get,
};

use crate::context::RequestContext;
use crate::error::AppResult;
use crate::state::AppState;

/// Endpoints of this blueprint, as `(endpoint, pattern)`.
pub const ENDPOINTS: &[(&str, &str)] = &[("extras.home", "/{lang}/extras")];

/// Create the extras router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/{lang}/extras", get(home))
}

async fn root(Extension(ctx): Extension<RequestContext>) -> Redirect {
    Redirect::to(&ctx.home_url)
}

async fn home(
    State(state): State<AppState>,
    Extension(mut ctx): Extension<RequestContext>,
) -> AppResult<Html<String>> {
    ctx.title = "Extras".to_string();
    let html = state.theme().render("extras.html", &ctx.to_tera())?;
    Ok(Html(html))
}

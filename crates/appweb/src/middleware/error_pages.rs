//! Unified error pages.
//!
//! Any response leaving the app with one of [`INTERCEPTED_STATUS_CODES`] has
//! its body replaced by the themed error page. The status code is kept; the
//! title and description come from a small curated table, with every other
//! code sharing the 500 text.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::context::RequestContext;
use crate::middleware::language::error_locale;
use crate::state::AppState;
use crate::theme::ThemeEngine;

/// Status codes rendered as error pages. Everything else passes through.
pub const INTERCEPTED_STATUS_CODES: [u16; 20] = [
    400, 401, 403, 404, 405, 408, 409, 410, 411, 412, 413, 414, 415, 416, 417, 418, 500, 501,
    502, 503,
];

/// User-facing text for one error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMessage {
    pub title: &'static str,
    pub description: &'static str,
}

const SERVER_ERROR: ErrorMessage = ErrorMessage {
    title: "An error happened",
    description: "We had some problems displaying this page. Maybe later we can show it to you.",
};

/// Curated messages. Codes missing here use [`SERVER_ERROR`].
const ERROR_MESSAGES: [(u16, ErrorMessage); 4] = [
    (
        404,
        ErrorMessage {
            title: "Page not found",
            description: "The requested address does not exists.",
        },
    ),
    (
        410,
        ErrorMessage {
            title: "Page not available",
            description: "The requested address is no longer available.",
        },
    ),
    (500, SERVER_ERROR),
    (
        503,
        ErrorMessage {
            title: "Service unavailable",
            description: "This page is temporarily unavailable. Please try again later.",
        },
    ),
];

/// Whether responses with `status` are replaced by the error page.
pub fn is_intercepted(status: StatusCode) -> bool {
    INTERCEPTED_STATUS_CODES.contains(&status.as_u16())
}

/// Code used for the page: the raised code, or 500 when none was carried.
pub fn effective_status(raised: Option<StatusCode>) -> StatusCode {
    raised.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Message for `code`, falling back to the 500 entry.
pub fn error_message(code: u16) -> ErrorMessage {
    ERROR_MESSAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, message)| *message)
        .unwrap_or(SERVER_ERROR)
}

/// Middleware replacing intercepted error responses with the error page.
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let headers = request.headers().clone();

    let response = next.run(request).await;
    if !is_intercepted(response.status()) {
        return response;
    }

    let status = effective_status(Some(response.status()));
    let mut page = render_error_page(&state, status, &path, &headers);

    // Keep headers such as `Allow` on 405; the body headers belong to the page.
    let own: Vec<_> = page.headers().keys().cloned().collect();
    for (name, value) in response.headers() {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH || own.contains(name) {
            continue;
        }
        page.headers_mut().append(name.clone(), value.clone());
    }

    page
}

/// Render the error page for `status` as seen from request `path`.
pub fn render_error_page(
    state: &AppState,
    status: StatusCode,
    path: &str,
    headers: &HeaderMap,
) -> Response {
    let code = status.as_u16();
    let message = error_message(code);
    let lang = error_locale(path);

    tracing::debug!(code, path = %path, lang = %lang, "rendering error page");

    let mut request_context = RequestContext::init(state, lang, headers);
    request_context.title = message.title.to_string();

    let mut context = request_context.to_tera();
    context.insert("code", &code.to_string());
    context.insert("title", message.title);
    context.insert("description", message.description);

    let suggestions = ThemeEngine::error_suggestions(code);
    let suggestion_refs: Vec<&str> = suggestions.iter().map(String::as_str).collect();
    let rendered = state
        .theme()
        .resolve_template(&suggestion_refs)
        .ok_or_else(|| tera::Error::template_not_found("error.html"))
        .and_then(|template| state.theme().render(&template, &context));

    let html = match rendered {
        Ok(html) => html,
        Err(e) => {
            tracing::error!(error = ?e, code, "failed to render error template");
            fallback_page(code, message)
        }
    };

    (status, Html(html)).into_response()
}

/// Minimal page used when the error template itself cannot be rendered.
fn fallback_page(code: u16, message: ErrorMessage) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>{code} {title}</title></head>
<body><h1>{title}</h1><p>{description}</p></body></html>"#,
        title = html_escape(message.title),
        description = html_escape(message.description),
    )
}

/// HTML-escape a string for safe output.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

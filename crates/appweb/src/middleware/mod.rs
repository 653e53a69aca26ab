//! HTTP middleware components.
//!
//! Request flow (outermost first): error pages → trailing-slash
//! canonicalization → locale resolution → route handler.

pub mod error_pages;
pub mod language;
pub mod normalize;

pub use error_pages::render_error_pages;
pub use language::{DEFAULT_LOCALE, RouteValues, resolve_locale};
pub use normalize::canonicalize_trailing_slash;

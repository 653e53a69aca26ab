//! Theme engine and template rendering.
//!
//! Provides Tera-based template rendering with template suggestion resolution
//! and the asset versioning helpers used by the page templates.

mod engine;

pub use engine::ThemeEngine;

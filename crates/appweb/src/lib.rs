//! appweb Library
//!
//! Request pipeline of the torrent search front end: versioned static
//! assets, locale-carrying URLs, trailing-slash canonicalization, unified
//! error pages and category remapping of file views.
//! The main entry point for running the server is the `appweb` binary.

pub mod bots;
pub mod cache;
pub mod category;
pub mod config;
pub mod context;
pub mod error;
pub mod middleware;
pub mod revision;
pub mod routes;
pub mod state;
pub mod store;
pub mod theme;
pub mod urls;

pub use config::Config;
pub use state::AppState;

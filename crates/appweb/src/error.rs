//! Application error types.
//!
//! Handlers return [`AppError`]; its response only carries the status code
//! and a short body. The error page middleware replaces the body of every
//! intercepted status with the rendered error template.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::store::StoreError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("gone")]
    Gone,

    #[error("service unavailable")]
    Unavailable,

    #[error("file store error")]
    Store(#[from] StoreError),

    #[error("template error")]
    Template(#[from] tera::Error),
}

impl AppError {
    /// Status code carried by the error, if any.
    ///
    /// Internal failures carry none and are reported as 500.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            AppError::NotFound => Some(StatusCode::NOT_FOUND),
            AppError::Gone => Some(StatusCode::GONE),
            AppError::Unavailable => Some(StatusCode::SERVICE_UNAVAILABLE),
            AppError::Internal(_) | AppError::Store(_) | AppError::Template(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .status_code()
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            AppError::Store(e) => {
                tracing::error!(error = %e, "file store error");
                "internal server error".to_string()
            }
            AppError::Template(e) => {
                tracing::error!(error = ?e, "template error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

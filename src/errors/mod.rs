//! Error normalization for API responses
//!
//! Data-layer faults flow into [`ServiceError`], whose [`IntoResponse`]
//! impl is the pipeline's designated error sink: it applies defaults,
//! classifies recognized store errors (production only) and renders the
//! body at the detail level the active environment allows.

pub mod app_error;
pub mod classify;
pub mod render;

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::db::StoreError;

pub use app_error::{AppError, ErrorStatus};
pub use render::{current_environment, install_environment};

/// Any failure a request handler can surface.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    App(#[from] AppError),
}

impl ServiceError {
    /// The error as the renderer sees it when no classification applies:
    /// deliberate [`AppError`]s pass through unchanged, everything else
    /// gets the 500/`error` defaults.
    pub fn to_app_error(&self) -> AppError {
        match self {
            Self::App(app) => app.clone(),
            Self::Store(store) => AppError::from_untyped(store),
        }
    }

    /// Operational replacement for a recognized store error, if any.
    pub fn classified(&self) -> Option<AppError> {
        match self {
            Self::Store(store) => classify::classify_store_error(store),
            Self::App(_) => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        render::global_error_response(&self, render::current_environment())
    }
}

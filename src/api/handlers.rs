use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::db;
use crate::errors::{AppError, ServiceError};
use crate::models::category::NewCategory;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub pool: PgPool,
}

/// Generic API response wrapper for successful requests. Failures never
/// pass through here: they render via the error sink.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "catalog-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<NewCategory>,
) -> Result<impl IntoResponse, ServiceError> {
    let category = db::categories::insert(&state.pool, &payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let categories = db::categories::list(&state.pool).await?;
    Ok(Json(ApiResponse::success(categories)))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = db::categories::parse_category_id(&id)?;

    let category = db::categories::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("No category found with that ID"))?;

    Ok(Json(ApiResponse::success(category)))
}

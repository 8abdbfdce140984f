use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{AuthUser, Role};
use crate::services::ProductService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let service = ProductService::new(state.db.clone());
    let categories = service.list_categories().await?;

    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = ProductService::new(state.db.clone());
    let category = service.get_category(id).await?;

    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    if user.role != Role::Admin {
        return Err(AppError::Unauthorized(
            "only admins can create categories".to_string(),
        ));
    }

    let service = ProductService::new(state.db.clone());
    let category = service.create_category(request.name).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

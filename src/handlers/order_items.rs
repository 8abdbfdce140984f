use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::ItemStatus;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::services::OrderItemService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ItemStatus,
}

pub async fn list_seller_items(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let service = OrderItemService::new(state.db.clone());
    let items = service.list_for_seller(user.id).await?;

    Ok(Json(items))
}

pub async fn get_seller_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = OrderItemService::new(state.db.clone());
    let item = service.get_for_seller(id, user.id).await?;

    Ok(Json(item))
}

pub async fn update_item_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = OrderItemService::new(state.db.clone());
    let item = service.update_status(id, user.id, request.status).await?;

    Ok(Json(item))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::services::CartService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let service = CartService::new(state.db.clone());
    let lines = service.list(user.id).await?;

    Ok(Json(lines))
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AddToCartRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = CartService::new(state.db.clone());
    let item = service
        .add_item(user.id, request.product_id, request.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCartItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = CartService::new(state.db.clone());

    match service.update_quantity(user.id, id, request.quantity).await? {
        Some(item) => Ok(Json(item).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

pub async fn delete_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = CartService::new(state.db.clone());
    service.remove(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let service = CartService::new(state.db.clone());
    service.clear(user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

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
use crate::services::{OrderLine, OrderService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let lines: Vec<OrderLine> = request
        .items
        .into_iter()
        .map(|line| OrderLine {
            product_id: line.product_id,
            quantity: line.quantity,
        })
        .collect();

    let service = OrderService::new(state.db.clone());
    let aggregate = service.create_order(user.id, &lines).await?;

    Ok((StatusCode::CREATED, Json(aggregate)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let service = OrderService::new(state.db.clone());
    let orders = service.list_for_user(user.id).await?;

    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = OrderService::new(state.db.clone());
    let aggregate = service.get_order(id).await?;

    if aggregate.order.user_id != user.id && user.role != Role::Admin {
        return Err(AppError::Unauthorized(
            "order belongs to another user".to_string(),
        ));
    }

    Ok(Json(aggregate))
}

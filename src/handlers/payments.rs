use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{AuthUser, Role};
use crate::services::{CallbackInput, OrderService, PaymentService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub order_id: Uuid,
}

pub async fn create_session(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderService::new(state.db.clone());
    let aggregate = orders.get_order(request.order_id).await?;
    if aggregate.order.user_id != user.id && user.role != Role::Admin {
        return Err(AppError::Unauthorized(
            "order belongs to another user".to_string(),
        ));
    }

    let service = PaymentService::new(state.db.clone(), state.gateway.clone());
    let payment = service.create_session(request.order_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "order_id": payment.order_id,
            "snap_token": payment.snap_token,
        })),
    ))
}

pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderService::new(state.db.clone());
    let aggregate = orders.get_order(order_id).await?;
    if aggregate.order.user_id != user.id && user.role != Role::Admin {
        return Err(AppError::Unauthorized(
            "order belongs to another user".to_string(),
        ));
    }

    let service = PaymentService::new(state.db.clone(), state.gateway.clone());
    let payment = service.get_by_order(order_id).await?;

    Ok(Json(payment))
}

/// Fields of a gateway notification the webhook consumes.
#[derive(Debug, Clone)]
pub struct CallbackParams {
    pub order_id: Uuid,
    pub transaction_id: String,
    pub transaction_status: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
}

/// Pull the required fields out of a raw notification body. Anything
/// missing or malformed is an invalid payload.
pub fn parse_callback(payload: &serde_json::Value) -> Result<CallbackParams, AppError> {
    let field = |name: &str| -> Result<&str, AppError> {
        payload
            .get(name)
            .and_then(|value| value.as_str())
            .ok_or_else(|| AppError::InvalidPayload(format!("missing field: {}", name)))
    };

    let order_id = Uuid::parse_str(field("order_id")?)
        .map_err(|_| AppError::InvalidPayload("order_id is not a valid UUID".to_string()))?;

    Ok(CallbackParams {
        order_id,
        transaction_id: field("transaction_id")?.to_string(),
        transaction_status: field("transaction_status")?.to_string(),
        status_code: field("status_code")?.to_string(),
        gross_amount: field("gross_amount")?.to_string(),
        signature_key: field("signature_key")?.to_string(),
    })
}

pub async fn webhook(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let params = parse_callback(&payload)?;

    if !state.gateway.verify_signature(
        &params.order_id.to_string(),
        &params.status_code,
        &params.gross_amount,
        &params.signature_key,
    ) {
        return Err(AppError::Unauthorized(
            "invalid webhook signature".to_string(),
        ));
    }

    let service = PaymentService::new(state.db.clone(), state.gateway.clone());
    let outcome = service
        .apply_callback(CallbackInput {
            order_id: params.order_id,
            transaction_id: params.transaction_id,
            transaction_status: params.transaction_status,
        })
        .await?;

    Ok(Json(outcome))
}

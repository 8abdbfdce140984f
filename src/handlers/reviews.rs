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
use crate::services::ProductService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = ProductService::new(state.db.clone());
    let reviews = service.list_reviews(product_id).await?;

    Ok(Json(reviews))
}

pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = ProductService::new(state.db.clone());
    let review = service
        .create_review(
            user.id,
            product_id,
            request.rating,
            request.comment.unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(review)))
}

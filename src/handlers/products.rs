use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::services::product_service::{ProductInput, ProductService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
}

impl ProductRequest {
    fn into_input(self) -> ProductInput {
        ProductInput {
            name: self.name,
            description: self.description.unwrap_or_default(),
            price: self.price,
            stock: self.stock.unwrap_or(0),
            category_id: self.category_id,
        }
    }
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ProductService::new(state.db.clone());
    let (products, total) = service.list(page, per_page).await?;

    Ok(Json(PaginatedResponse {
        data: products,
        total,
        page,
    }))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = ProductService::new(state.db.clone());
    let product = service.get(id).await?;

    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !user.can_manage_catalog() {
        return Err(AppError::Unauthorized(
            "only sellers can create products".to_string(),
        ));
    }

    let service = ProductService::new(state.db.clone());
    let product = service.create(user.id, request.into_input()).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = ProductService::new(state.db.clone());
    let product = service.update(&user, id, request.into_input()).await?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = ProductService::new(state.db.clone());
    service.delete(&user, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

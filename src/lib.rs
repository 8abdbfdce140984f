pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::gateway::PaymentGateway;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub gateway: Arc<dyn PaymentGateway>,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route(
            "/products/:id/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::create_review),
        )
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route("/categories/:id", get(handlers::categories::get_category))
        .route(
            "/cart",
            get(handlers::cart::get_cart)
                .post(handlers::cart::add_to_cart)
                .delete(handlers::cart::clear_cart),
        )
        .route(
            "/cart/items/:id",
            put(handlers::cart::update_cart_item).delete(handlers::cart::delete_cart_item),
        )
        .route(
            "/orders",
            get(handlers::orders::list_orders).post(handlers::orders::create_order),
        )
        .route("/orders/:id", get(handlers::orders::get_order))
        .route(
            "/seller/order-items",
            get(handlers::order_items::list_seller_items),
        )
        .route(
            "/seller/order-items/:id",
            get(handlers::order_items::get_seller_item),
        )
        .route(
            "/seller/order-items/:id/status",
            put(handlers::order_items::update_item_status),
        )
        .route("/payments", post(handlers::payments::create_session))
        .route("/payments/webhook", post(handlers::payments::webhook))
        .route("/payments/:order_id", get(handlers::payments::get_payment))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

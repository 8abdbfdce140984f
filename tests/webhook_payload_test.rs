use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use storefront_core::gateway::SnapClient;
use storefront_core::handlers::payments::parse_callback;
use storefront_core::{create_app, AppState};

/// App wired with a lazy pool: requests that fail before touching the
/// database (payload parsing, signature checks) can be tested without
/// a running Postgres.
fn test_app() -> axum::Router {
    let pool = sqlx::PgPool::connect_lazy("postgres://localhost/unreachable")
        .expect("lazy pool construction should not fail");
    let gateway = SnapClient::new("http://localhost".to_string(), "test-key".to_string());

    create_app(AppState {
        db: pool,
        gateway: Arc::new(gateway),
    })
}

#[test]
fn test_parse_callback_accepts_complete_payload() {
    let payload = json!({
        "order_id": "7f1cdbf8-9c3a-4df1-b2da-5cf0c1f211a6",
        "transaction_id": "txn-123",
        "transaction_status": "settlement",
        "status_code": "200",
        "gross_amount": "25000.00",
        "signature_key": "abcdef"
    });

    let params = parse_callback(&payload).expect("payload should parse");
    assert_eq!(params.transaction_id, "txn-123");
    assert_eq!(params.transaction_status, "settlement");
    assert_eq!(params.gross_amount, "25000.00");
}

#[test]
fn test_parse_callback_rejects_missing_transaction_status() {
    let payload = json!({
        "order_id": "7f1cdbf8-9c3a-4df1-b2da-5cf0c1f211a6",
        "transaction_id": "txn-123",
        "status_code": "200",
        "gross_amount": "25000.00",
        "signature_key": "abcdef"
    });

    let err = parse_callback(&payload).expect_err("missing field should fail");
    assert!(err.to_string().contains("transaction_status"));
}

#[test]
fn test_parse_callback_rejects_non_uuid_order_id() {
    let payload = json!({
        "order_id": "ORDER-1",
        "transaction_id": "txn-123",
        "transaction_status": "settlement",
        "status_code": "200",
        "gross_amount": "25000.00",
        "signature_key": "abcdef"
    });

    assert!(parse_callback(&payload).is_err());
}

#[test]
fn test_parse_callback_rejects_numeric_fields() {
    // The gateway sends every field as a string; a numeric gross_amount is
    // a malformed payload, not a value to coerce.
    let payload = json!({
        "order_id": "7f1cdbf8-9c3a-4df1-b2da-5cf0c1f211a6",
        "transaction_id": "txn-123",
        "transaction_status": "settlement",
        "status_code": 200,
        "gross_amount": 25000.0,
        "signature_key": "abcdef"
    });

    assert!(parse_callback(&payload).is_err());
}

#[tokio::test]
async fn test_webhook_rejects_malformed_payload() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/payments/webhook")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "order_id": "not-a-uuid" }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_rejects_invalid_signature() {
    let app = test_app();

    let payload = json!({
        "order_id": "7f1cdbf8-9c3a-4df1-b2da-5cf0c1f211a6",
        "transaction_id": "txn-123",
        "transaction_status": "settlement",
        "status_code": "200",
        "gross_amount": "25000.00",
        "signature_key": "definitely-wrong"
    });

    let request = Request::builder()
        .method("POST")
        .uri("/payments/webhook")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_order_endpoints_require_identity_headers() {
    let app = test_app();

    let request = Request::builder()
        .method("GET")
        .uri("/orders")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

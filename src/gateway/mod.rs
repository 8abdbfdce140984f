//! Payment gateway client.
//!
//! The core only needs two things from the gateway: a checkout token for a
//! new payment session, and verification of the webhook signature before a
//! callback reaches the payment service. Everything else about the gateway
//! protocol stays behind this module.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid response from gateway: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout token for an order and its gross amount.
    async fn create_transaction_token(
        &self,
        order_id: Uuid,
        gross_amount: &BigDecimal,
    ) -> Result<String, GatewayError>;

    /// Verify a webhook notification signature. The gateway signs
    /// `order_id + status_code + gross_amount + server_key` with SHA-512.
    fn verify_signature(
        &self,
        order_id: &str,
        status_code: &str,
        gross_amount: &str,
        signature_key: &str,
    ) -> bool;
}

/// HTTP client for the Snap-style checkout API of the payment gateway.
#[derive(Clone)]
pub struct SnapClient {
    client: Client,
    base_url: String,
    server_key: String,
}

impl SnapClient {
    pub fn new(base_url: String, server_key: String) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        SnapClient {
            client,
            base_url,
            server_key,
        }
    }
}

#[derive(Debug, Serialize)]
struct SnapRequest {
    transaction_details: TransactionDetails,
}

#[derive(Debug, Serialize)]
struct TransactionDetails {
    order_id: String,
    gross_amount: String,
}

#[derive(Debug, Deserialize)]
struct SnapResponse {
    token: String,
}

#[async_trait]
impl PaymentGateway for SnapClient {
    async fn create_transaction_token(
        &self,
        order_id: Uuid,
        gross_amount: &BigDecimal,
    ) -> Result<String, GatewayError> {
        let request = SnapRequest {
            transaction_details: TransactionDetails {
                order_id: order_id.to_string(),
                gross_amount: gross_amount.to_string(),
            },
        };

        let response = self
            .client
            .post(format!("{}/snap/v1/transactions", self.base_url))
            .basic_auth(&self.server_key, Some(""))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::InvalidResponse(format!(
                "gateway returned status {}",
                response.status()
            )));
        }

        let body: SnapResponse = response.json().await?;
        Ok(body.token)
    }

    fn verify_signature(
        &self,
        order_id: &str,
        status_code: &str,
        gross_amount: &str,
        signature_key: &str,
    ) -> bool {
        let payload = format!(
            "{}{}{}{}",
            order_id, status_code, gross_amount, self.server_key
        );
        let digest = Sha512::digest(payload.as_bytes());
        hex::encode(digest) == signature_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_signature_accepts_matching_digest() {
        let client = SnapClient::new("http://localhost".to_string(), "server-key".to_string());

        let payload = format!("{}{}{}{}", "order-1", "200", "25000.00", "server-key");
        let expected = hex::encode(Sha512::digest(payload.as_bytes()));

        assert!(client.verify_signature("order-1", "200", "25000.00", &expected));
    }

    #[test]
    fn test_verify_signature_rejects_mismatch() {
        let client = SnapClient::new("http://localhost".to_string(), "server-key".to_string());

        assert!(!client.verify_signature("order-1", "200", "25000.00", "not-a-signature"));
    }
}

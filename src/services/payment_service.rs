use std::sync::Arc;

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::Payment;
use crate::db::queries;
use crate::domain::{map_gateway_status, OrderStatus, PaymentStatus};
use crate::error::AppError;
use crate::gateway::PaymentGateway;

const CART_CLEAR_ATTEMPTS: u32 = 3;

/// Parsed gateway notification, signature already verified by the caller.
#[derive(Debug, Clone)]
pub struct CallbackInput {
    pub order_id: Uuid,
    pub transaction_id: String,
    pub transaction_status: String,
}

#[derive(Debug, Serialize)]
pub struct CallbackOutcome {
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    /// True when the notification was a replay and nothing changed.
    pub replayed: bool,
    /// Present only after a successful payment; false means the post-commit
    /// cart clear failed and was logged.
    pub cart_cleared: Option<bool>,
}

pub struct PaymentService {
    pool: PgPool,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { pool, gateway }
    }

    /// Create the payment session for an order: one checkout token, one
    /// `payments` row. Asking again for the same order returns the stored
    /// payment instead of creating a second session.
    pub async fn create_session(&self, order_id: Uuid) -> Result<Payment, AppError> {
        let order = queries::get_order(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))?;

        if let Some(existing) = queries::get_payment_by_order(&self.pool, order_id).await? {
            return Ok(existing);
        }

        let token = self
            .gateway
            .create_transaction_token(order.id, &order.total_price)
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        let payment = Payment::new(order.id, order.total_price.clone(), token);
        match queries::insert_payment(&self.pool, &payment).await? {
            Some(created) => {
                tracing::info!("created payment session for order {}", order.id);
                Ok(created)
            }
            // Lost a race against a concurrent session request; reuse theirs.
            None => queries::get_payment_by_order(&self.pool, order_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("payment for order {}", order_id))),
        }
    }

    pub async fn get_by_order(&self, order_id: Uuid) -> Result<Payment, AppError> {
        queries::get_payment_by_order(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("payment for order {}", order_id)))
    }

    /// Apply a gateway notification to the payment, the order and its items
    /// in one transaction.
    ///
    /// Replaying a terminal notification is a no-op; a terminal notification
    /// that disagrees with the stored terminal status is a conflict. The
    /// user's cart is cleared after a successful commit, best-effort.
    pub async fn apply_callback(&self, input: CallbackInput) -> Result<CallbackOutcome, AppError> {
        let (payment_status, order_status) = map_gateway_status(&input.transaction_status);

        let mut tx = self.pool.begin().await?;

        let order = queries::get_order_for_update(&mut tx, input.order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", input.order_id)))?;

        let payment = queries::get_payment_for_update(&mut tx, input.order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("payment for order {}", input.order_id)))?;

        if payment.status.is_terminal() {
            tx.rollback().await?;

            if payment.status == payment_status {
                tracing::info!(
                    "replayed {} notification for order {}, skipping",
                    payment_status,
                    order.id
                );
                return Ok(CallbackOutcome {
                    payment_status,
                    order_status: order.status,
                    replayed: true,
                    cart_cleared: None,
                });
            }

            return Err(AppError::Conflict(format!(
                "payment for order {} is already {}, refusing {}",
                order.id, payment.status, payment_status
            )));
        }

        queries::update_payment_status(
            &mut tx,
            payment.id,
            payment_status,
            Some(input.transaction_id.as_str()),
        )
        .await?;

        match payment_status {
            PaymentStatus::Success => {
                queries::update_order_status(&mut tx, order.id, order_status).await?;
                let moved = queries::mark_items_processing(&mut tx, order.id).await?;
                tx.commit().await?;

                tracing::info!(
                    "payment for order {} settled, {} items moved to processing",
                    order.id,
                    moved
                );

                let cart_cleared = self.clear_cart_with_retry(order.user_id).await;
                Ok(CallbackOutcome {
                    payment_status,
                    order_status,
                    replayed: false,
                    cart_cleared: Some(cart_cleared),
                })
            }
            PaymentStatus::Cancel | PaymentStatus::Expired | PaymentStatus::Failed => {
                queries::update_order_status(&mut tx, order.id, order_status).await?;
                queries::mark_items_cancelled(&mut tx, order.id).await?;
                tx.commit().await?;

                tracing::info!(
                    "payment for order {} ended as {}, order cancelled",
                    order.id,
                    payment_status
                );

                Ok(CallbackOutcome {
                    payment_status,
                    order_status,
                    replayed: false,
                    cart_cleared: None,
                })
            }
            PaymentStatus::Pending => {
                // Transaction id is recorded; order and items stay as they are.
                tx.commit().await?;
                Ok(CallbackOutcome {
                    payment_status,
                    order_status: order.status,
                    replayed: false,
                    cart_cleared: None,
                })
            }
        }
    }

    /// Post-commit cart clear. Never fails the payment update: every attempt
    /// is logged and the final outcome is surfaced to the caller.
    async fn clear_cart_with_retry(&self, user_id: Uuid) -> bool {
        for attempt in 1..=CART_CLEAR_ATTEMPTS {
            match queries::clear_cart(&self.pool, user_id).await {
                Ok(removed) => {
                    tracing::info!("cleared {} cart items for user {}", removed, user_id);
                    return true;
                }
                Err(e) => {
                    tracing::warn!(
                        "cart clear attempt {}/{} for user {} failed: {}",
                        attempt,
                        CART_CLEAR_ATTEMPTS,
                        user_id,
                        e
                    );
                }
            }
        }

        tracing::error!(
            "giving up on clearing cart for user {} after {} attempts",
            user_id,
            CART_CLEAR_ATTEMPTS
        );
        false
    }
}

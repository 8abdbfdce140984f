use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::models::OrderItem;
use crate::db::queries;
use crate::domain::{derive_order_status, ItemStatus};
use crate::error::AppError;

pub struct OrderItemService {
    pool: PgPool,
}

impl OrderItemService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply a seller-requested status change to one order item and
    /// recompute the parent order's derived status in the same transaction.
    ///
    /// The item row is locked first, then the order row; every update path
    /// takes the locks in that sequence, so concurrent updates on items of
    /// the same order serialize on the order row.
    pub async fn update_status(
        &self,
        item_id: Uuid,
        seller_id: Uuid,
        new_status: ItemStatus,
    ) -> Result<OrderItem, AppError> {
        let mut tx = self.pool.begin().await?;

        let item = queries::get_order_item_for_update(&mut tx, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order item {}", item_id)))?;

        let product = queries::get_product_for_update(&mut tx, item.product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", item.product_id)))?;

        if product.seller_id != seller_id {
            tx.rollback().await?;
            return Err(AppError::Unauthorized(
                "you are not the seller of this product".to_string(),
            ));
        }

        if !item.status.can_transition(new_status) {
            tx.rollback().await?;
            return Err(AppError::InvalidTransition {
                from: item.status,
                to: new_status,
            });
        }

        let updated = queries::update_order_item_status(&mut tx, item_id, new_status).await?;
        recompute_order_status(&mut tx, item.order_id).await?;

        tx.commit().await?;

        tracing::info!(
            "order item {} moved from {} to {} by seller {}",
            item_id,
            item.status,
            new_status,
            seller_id
        );

        Ok(updated)
    }

    pub async fn list_for_seller(&self, seller_id: Uuid) -> Result<Vec<OrderItem>, AppError> {
        Ok(queries::list_seller_order_items(&self.pool, seller_id).await?)
    }

    pub async fn get_for_seller(
        &self,
        item_id: Uuid,
        seller_id: Uuid,
    ) -> Result<OrderItem, AppError> {
        queries::get_seller_order_item(&self.pool, item_id, seller_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order item {}", item_id)))
    }
}

/// Recompute the derived order status from the item statuses and persist it
/// if it changed. Terminal orders are left untouched.
async fn recompute_order_status(
    tx: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<(), AppError> {
    let order = queries::get_order_for_update(tx, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))?;

    let statuses = queries::order_item_statuses(tx, order_id).await?;

    if let Some(next) = derive_order_status(order.status, &statuses) {
        if next != order.status {
            queries::update_order_status(tx, order_id, next).await?;
            tracing::info!("order {} status recomputed to {}", order_id, next);
        }
    }

    Ok(())
}

use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Order, OrderAggregate, OrderItem};
use crate::db::queries;
use crate::error::AppError;

/// One requested order line: which product and how many.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

pub struct OrderService {
    pool: PgPool,
}

impl OrderService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an order, reserving stock for every line atomically.
    ///
    /// Each product row is locked for the duration of the transaction; if
    /// any line cannot be satisfied the whole transaction rolls back and no
    /// stock is consumed.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        lines: &[OrderLine],
    ) -> Result<OrderAggregate, AppError> {
        if lines.is_empty() {
            return Err(AppError::InvalidPayload(
                "order must contain at least one item".to_string(),
            ));
        }
        if lines.iter().any(|line| line.quantity <= 0) {
            return Err(AppError::InvalidPayload(
                "item quantity must be positive".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let mut total = BigDecimal::from(0);
        let mut priced = Vec::with_capacity(lines.len());

        for line in lines {
            let product = queries::get_product_for_update(&mut tx, line.product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("product {}", line.product_id)))?;

            if product.stock < line.quantity {
                tx.rollback().await?;
                return Err(AppError::InsufficientStock(product.name));
            }

            // Unit price is frozen at order time.
            let price = product.price.clone() * BigDecimal::from(line.quantity);
            total = total + price.clone();

            queries::decrement_stock(&mut tx, product.id, line.quantity).await?;
            priced.push((product.id, line.quantity, price));
        }

        let order = queries::insert_order(&mut tx, &Order::new(user_id, total)).await?;

        let mut items = Vec::with_capacity(priced.len());
        for (product_id, quantity, price) in priced {
            let item = queries::insert_order_item(
                &mut tx,
                &OrderItem::new(order.id, product_id, quantity, price),
            )
            .await?;
            items.push(item);
        }

        tx.commit().await?;

        tracing::info!(
            "created order {} for user {} with {} items, total {}",
            order.id,
            user_id,
            items.len(),
            order.total_price
        );

        Ok(OrderAggregate { order, items })
    }

    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderAggregate, AppError> {
        let order = queries::get_order(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {}", order_id)))?;
        let items = queries::list_order_items(&self.pool, order_id).await?;

        Ok(OrderAggregate { order, items })
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderAggregate>, AppError> {
        let orders = queries::list_orders_for_user(&self.pool, user_id).await?;

        let mut aggregates = Vec::with_capacity(orders.len());
        for order in orders {
            let items = queries::list_order_items(&self.pool, order.id).await?;
            aggregates.push(OrderAggregate { order, items });
        }

        Ok(aggregates)
    }
}

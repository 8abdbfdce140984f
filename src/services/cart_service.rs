use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{CartItem, CartLine};
use crate::db::queries;
use crate::error::AppError;

pub struct CartService {
    pool: PgPool,
}

impl CartService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a product to the user's cart. An existing line for the same
    /// product accumulates the quantity instead of duplicating the row.
    pub async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, AppError> {
        if quantity <= 0 {
            return Err(AppError::InvalidPayload(
                "quantity must be positive".to_string(),
            ));
        }

        queries::get_product(&self.pool, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", product_id)))?;

        Ok(queries::upsert_cart_item(&self.pool, user_id, product_id, quantity).await?)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<CartLine>, AppError> {
        Ok(queries::list_cart(&self.pool, user_id).await?)
    }

    /// Set the quantity of a cart line; zero removes the line.
    pub async fn update_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItem>, AppError> {
        if quantity < 0 {
            return Err(AppError::InvalidPayload(
                "quantity must not be negative".to_string(),
            ));
        }

        let item = queries::get_cart_item(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("cart item {}", item_id)))?;

        if item.user_id != user_id {
            return Err(AppError::Unauthorized(
                "cart item belongs to another user".to_string(),
            ));
        }

        if quantity == 0 {
            queries::delete_cart_item(&self.pool, item_id).await?;
            return Ok(None);
        }

        Ok(Some(
            queries::set_cart_item_quantity(&self.pool, item_id, quantity).await?,
        ))
    }

    pub async fn remove(&self, user_id: Uuid, item_id: Uuid) -> Result<(), AppError> {
        let item = queries::get_cart_item(&self.pool, item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("cart item {}", item_id)))?;

        if item.user_id != user_id {
            return Err(AppError::Unauthorized(
                "cart item belongs to another user".to_string(),
            ));
        }

        queries::delete_cart_item(&self.pool, item_id).await?;
        Ok(())
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<u64, AppError> {
        Ok(queries::clear_cart(&self.pool, user_id).await?)
    }
}

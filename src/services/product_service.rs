use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{Category, Product, Review};
use crate::db::queries;
use crate::error::AppError;
use crate::middleware::auth::{AuthUser, Role};

/// Fields a seller may set on a product.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub category_id: Option<Uuid>,
}

pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, seller_id: Uuid, input: ProductInput) -> Result<Product, AppError> {
        validate_product_input(&input)?;

        if let Some(category_id) = input.category_id {
            queries::get_category(&self.pool, category_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("category {}", category_id)))?;
        }

        let product = Product::new(
            input.name,
            input.description,
            input.price,
            input.stock,
            seller_id,
            input.category_id,
        );

        Ok(queries::insert_product(&self.pool, &product).await?)
    }

    pub async fn list(&self, page: u32, per_page: u32) -> Result<(Vec<Product>, i64), AppError> {
        let page = page.max(1);
        let limit = per_page as i64;
        let offset = ((page - 1) * per_page) as i64;

        let products = queries::list_products(&self.pool, limit, offset).await?;
        let total = queries::count_products(&self.pool).await?;

        Ok((products, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, AppError> {
        queries::get_product(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
    }

    pub async fn update(
        &self,
        user: &AuthUser,
        id: Uuid,
        input: ProductInput,
    ) -> Result<Product, AppError> {
        validate_product_input(&input)?;

        let mut product = self.get(id).await?;
        check_ownership(user, &product)?;

        product.name = input.name;
        product.description = input.description;
        product.price = input.price;
        product.stock = input.stock;
        product.category_id = input.category_id;

        Ok(queries::update_product(&self.pool, &product).await?)
    }

    pub async fn delete(&self, user: &AuthUser, id: Uuid) -> Result<(), AppError> {
        let product = self.get(id).await?;
        check_ownership(user, &product)?;

        queries::delete_product(&self.pool, id).await?;
        Ok(())
    }

    // --- Categories ---

    pub async fn create_category(&self, name: String) -> Result<Category, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidPayload(
                "category name must not be empty".to_string(),
            ));
        }

        let category = Category {
            id: Uuid::new_v4(),
            name,
        };
        Ok(queries::insert_category(&self.pool, &category).await?)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, AppError> {
        queries::get_category(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {}", id)))
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(queries::list_categories(&self.pool).await?)
    }

    // --- Reviews ---

    pub async fn create_review(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Review, AppError> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::InvalidPayload(
                "rating must be between 1 and 5".to_string(),
            ));
        }

        queries::get_product(&self.pool, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", product_id)))?;

        let review = Review {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            rating,
            comment,
            created_at: chrono::Utc::now(),
        };

        Ok(queries::insert_review(&self.pool, &review).await?)
    }

    pub async fn list_reviews(&self, product_id: Uuid) -> Result<Vec<Review>, AppError> {
        Ok(queries::list_reviews_for_product(&self.pool, product_id).await?)
    }
}

fn validate_product_input(input: &ProductInput) -> Result<(), AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::InvalidPayload(
            "product name must not be empty".to_string(),
        ));
    }
    if input.price < BigDecimal::from(0) {
        return Err(AppError::InvalidPayload(
            "product price must not be negative".to_string(),
        ));
    }
    if input.stock < 0 {
        return Err(AppError::InvalidPayload(
            "product stock must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn check_ownership(user: &AuthUser, product: &Product) -> Result<(), AppError> {
    if user.role != Role::Admin && product.seller_id != user.id {
        return Err(AppError::Unauthorized(
            "you are not the seller of this product".to_string(),
        ));
    }
    Ok(())
}

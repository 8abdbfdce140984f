use sqlx::{PgPool, Postgres, Result, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::models::{
    CartItem, CartLine, Category, Order, OrderItem, Payment, Product, Review,
};
use crate::domain::{ItemStatus, OrderStatus, PaymentStatus};

// --- Product Queries ---

pub async fn insert_product(pool: &PgPool, product: &Product) -> Result<Product> {
    sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (
            id, name, description, price, stock, seller_id, category_id, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.price)
    .bind(product.stock)
    .bind(product.seller_id)
    .bind(product.category_id)
    .bind(product.created_at)
    .bind(product.updated_at)
    .fetch_one(pool)
    .await
}

pub async fn get_product(pool: &PgPool, id: Uuid) -> Result<Option<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_products(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Product>> {
    sqlx::query_as::<_, Product>(
        "SELECT * FROM products ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_products(pool: &PgPool) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await
}

pub async fn update_product(pool: &PgPool, product: &Product) -> Result<Product> {
    sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $2, description = $3, price = $4, stock = $5, category_id = $6,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(&product.price)
    .bind(product.stock)
    .bind(product.category_id)
    .fetch_one(pool)
    .await
}

pub async fn delete_product(pool: &PgPool, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Load a product under a row-level lock for the duration of the transaction.
pub async fn get_product_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Product>> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **executor)
        .await
}

pub async fn decrement_stock(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    quantity: i32,
) -> Result<()> {
    sqlx::query("UPDATE products SET stock = stock - $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(quantity)
        .execute(&mut **executor)
        .await?;
    Ok(())
}

// --- Category Queries ---

pub async fn insert_category(pool: &PgPool, category: &Category) -> Result<Category> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name) VALUES ($1, $2) RETURNING *",
    )
    .bind(category.id)
    .bind(&category.name)
    .fetch_one(pool)
    .await
}

pub async fn get_category(pool: &PgPool, id: Uuid) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(pool)
        .await
}

// --- Review Queries ---

pub async fn insert_review(pool: &PgPool, review: &Review) -> Result<Review> {
    sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (id, user_id, product_id, rating, comment, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(review.id)
    .bind(review.user_id)
    .bind(review.product_id)
    .bind(review.rating)
    .bind(&review.comment)
    .bind(review.created_at)
    .fetch_one(pool)
    .await
}

pub async fn list_reviews_for_product(pool: &PgPool, product_id: Uuid) -> Result<Vec<Review>> {
    sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE product_id = $1 ORDER BY created_at DESC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await
}

// --- Cart Queries ---

pub async fn upsert_cart_item(
    pool: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> Result<CartItem> {
    sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, quantity, created_at, updated_at)
        VALUES ($1, $2, $3, $4, NOW(), NOW())
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(pool)
    .await
}

pub async fn list_cart(pool: &PgPool, user_id: Uuid) -> Result<Vec<CartLine>> {
    sqlx::query_as::<_, CartLine>(
        r#"
        SELECT cart_items.id, cart_items.product_id, products.name AS product_name,
               products.price AS unit_price, cart_items.quantity
        FROM cart_items
        JOIN products ON products.id = cart_items.product_id
        WHERE cart_items.user_id = $1
        ORDER BY cart_items.created_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn get_cart_item(pool: &PgPool, id: Uuid) -> Result<Option<CartItem>> {
    sqlx::query_as::<_, CartItem>("SELECT * FROM cart_items WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn set_cart_item_quantity(pool: &PgPool, id: Uuid, quantity: i32) -> Result<CartItem> {
    sqlx::query_as::<_, CartItem>(
        "UPDATE cart_items SET quantity = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(quantity)
    .fetch_one(pool)
    .await
}

pub async fn delete_cart_item(pool: &PgPool, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn clear_cart(pool: &PgPool, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// --- Order Queries ---

pub async fn insert_order(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order: &Order,
) -> Result<Order> {
    sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (id, user_id, total_price, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.total_price)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .fetch_one(&mut **executor)
    .await
}

pub async fn insert_order_item(
    executor: &mut SqlxTransaction<'_, Postgres>,
    item: &OrderItem,
) -> Result<OrderItem> {
    sqlx::query_as::<_, OrderItem>(
        r#"
        INSERT INTO order_items (id, order_id, product_id, quantity, price, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(item.id)
    .bind(item.order_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(&item.price)
    .bind(item.status)
    .fetch_one(&mut **executor)
    .await
}

pub async fn get_order(pool: &PgPool, id: Uuid) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_orders_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Order>> {
    sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn list_order_items(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderItem>> {
    sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

pub async fn get_order_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Order>> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **executor)
        .await
}

pub async fn update_order_status(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    status: OrderStatus,
) -> Result<()> {
    sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(&mut **executor)
        .await?;
    Ok(())
}

// --- Order Item Queries ---

pub async fn get_order_item_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<OrderItem>> {
    sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **executor)
        .await
}

pub async fn update_order_item_status(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    status: ItemStatus,
) -> Result<OrderItem> {
    sqlx::query_as::<_, OrderItem>(
        "UPDATE order_items SET status = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_one(&mut **executor)
    .await
}

pub async fn order_item_statuses(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<Vec<ItemStatus>> {
    sqlx::query_scalar::<_, ItemStatus>("SELECT status FROM order_items WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(&mut **executor)
        .await
}

pub async fn mark_items_processing(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE order_items SET status = 'processing' WHERE order_id = $1 AND status <> 'cancelled'",
    )
    .bind(order_id)
    .execute(&mut **executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn mark_items_cancelled(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE order_items SET status = 'cancelled' WHERE order_id = $1 AND status <> 'cancelled'",
    )
    .bind(order_id)
    .execute(&mut **executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn list_seller_order_items(pool: &PgPool, seller_id: Uuid) -> Result<Vec<OrderItem>> {
    sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT order_items.*
        FROM order_items
        JOIN products ON products.id = order_items.product_id
        WHERE products.seller_id = $1
        ORDER BY order_items.id
        "#,
    )
    .bind(seller_id)
    .fetch_all(pool)
    .await
}

pub async fn get_seller_order_item(
    pool: &PgPool,
    item_id: Uuid,
    seller_id: Uuid,
) -> Result<Option<OrderItem>> {
    sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT order_items.*
        FROM order_items
        JOIN products ON products.id = order_items.product_id
        WHERE order_items.id = $1 AND products.seller_id = $2
        "#,
    )
    .bind(item_id)
    .bind(seller_id)
    .fetch_optional(pool)
    .await
}

// --- Payment Queries ---

/// Insert the 1:1 payment row for an order. Returns `None` when a payment
/// already exists for the order (`payments.order_id` is UNIQUE).
pub async fn insert_payment(pool: &PgPool, payment: &Payment) -> Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (
            id, order_id, amount, snap_token, transaction_id, status, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (order_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(payment.id)
    .bind(payment.order_id)
    .bind(&payment.amount)
    .bind(&payment.snap_token)
    .bind(&payment.transaction_id)
    .bind(payment.status)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .fetch_optional(pool)
    .await
}

pub async fn get_payment_by_order(pool: &PgPool, order_id: Uuid) -> Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_payment_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    order_id: Uuid,
) -> Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE order_id = $1 FOR UPDATE")
        .bind(order_id)
        .fetch_optional(&mut **executor)
        .await
}

pub async fn update_payment_status(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    status: PaymentStatus,
    transaction_id: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE payments
        SET status = $2, transaction_id = COALESCE($3, transaction_id), updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(transaction_id)
    .execute(&mut **executor)
    .await?;
    Ok(())
}

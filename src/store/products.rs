//! Product records: the inventory ledger.
//!
//! Stock and price are mutated only through the staff endpoints; the
//! checkout flow reads stock but never decrements it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: Option<i32>,
    pub active: Option<bool>,
}

/// Offset in `i64` so a page number near `u32::MAX` cannot overflow.
fn page_offset(page: u32, per_page: u32) -> i64 {
    (i64::from(page) - 1) * i64::from(per_page)
}

pub async fn list_active(
    pool: &PgPool,
    page: u32,
    per_page: u32,
) -> Result<(Vec<Product>, i64), sqlx::Error> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT * FROM products WHERE active ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(per_page as i64)
    .bind(page_offset(page, per_page))
    .fetch_all(pool)
    .await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE active")
        .fetch_one(pool)
        .await?;
    Ok((products, total.0))
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Resolve a set of ids; missing ones are simply absent from the result.
pub async fn get_many<'e, E>(exec: E, ids: &[Uuid]) -> Result<Vec<Product>, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ANY($1)")
        .bind(ids.to_vec())
        .fetch_all(exec)
        .await
}

pub async fn create(pool: &PgPool, input: &ProductInput) -> Result<Product, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "INSERT INTO products (id, name, description, price, stock, active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.price)
    .bind(input.stock.unwrap_or(0))
    .bind(input.active.unwrap_or(true))
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &ProductInput,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "UPDATE products SET name = $2, description = $3, price = $4, stock = $5, \
         active = $6, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.price)
    .bind(input.stock.unwrap_or(0))
    .bind(input.active.unwrap_or(true))
    .fetch_optional(pool)
    .await
}

pub async fn set_active(pool: &PgPool, ids: &[Uuid], active: bool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE products SET active = $2, updated_at = NOW() WHERE id = ANY($1)")
        .bind(ids.to_vec())
        .bind(active)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Missing,
    /// Refused by referential integrity: the product has order lines.
    Blocked,
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<DeleteOutcome, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await;
    match result {
        Ok(done) if done.rows_affected() > 0 => Ok(DeleteOutcome::Deleted),
        Ok(_) => Ok(DeleteOutcome::Missing),
        Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23503") => {
            Ok(DeleteOutcome::Blocked)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset_widens_before_multiplying() {
        assert_eq!(page_offset(1, 20), 0);
        assert_eq!(page_offset(3, 20), 40);
        assert_eq!(page_offset(u32::MAX, 20), (u32::MAX as i64 - 1) * 20);
    }
}

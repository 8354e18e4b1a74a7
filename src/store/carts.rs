//! Session store for cart lines.
//!
//! The in-memory [`Cart`] is loaded from `cart_lines`, mutated, and written
//! back whole, mirroring a session-backed mapping.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartLine};

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
}

pub async fn load_cart(pool: &PgPool, session_id: &str) -> Result<Cart, sqlx::Error> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        "SELECT product_id, quantity, unit_price FROM cart_lines WHERE session_id = $1",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;

    let lines = rows
        .into_iter()
        .map(|r| CartLine {
            product_id: r.product_id,
            quantity: r.quantity.max(0) as u32,
            unit_price: r.unit_price,
        })
        .collect();
    Ok(Cart::from_lines(session_id, lines))
}

/// Replace the persisted mapping with the cart's current lines.
pub async fn save_cart(pool: &PgPool, cart: &Cart) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM cart_lines WHERE session_id = $1")
        .bind(cart.session_id())
        .execute(&mut *tx)
        .await?;
    for line in cart.lines() {
        sqlx::query(
            "INSERT INTO cart_lines (session_id, product_id, quantity, unit_price) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(cart.session_id())
        .bind(line.product_id)
        .bind(line.quantity as i32)
        .bind(line.unit_price)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

pub async fn clear_cart<'e, E>(exec: E, session_id: &str) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query("DELETE FROM cart_lines WHERE session_id = $1")
        .bind(session_id.to_string())
        .execute(exec)
        .await?;
    Ok(())
}

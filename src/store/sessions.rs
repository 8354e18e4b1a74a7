//! Checkout sessions: the in-progress order held across the multi-step
//! form flow, keyed by an opaque expiring token.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CheckoutSession {
    pub token: Uuid,
    pub session_id: String,
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub async fn create(
    conn: &mut PgConnection,
    session_id: &str,
    order_id: Uuid,
    ttl: Duration,
) -> Result<CheckoutSession, sqlx::Error> {
    sqlx::query_as::<_, CheckoutSession>(
        "INSERT INTO checkout_sessions (token, session_id, order_id, created_at, expires_at) \
         VALUES ($1, $2, $3, NOW(), $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(order_id)
    .bind(Utc::now() + ttl)
    .fetch_one(conn)
    .await
}

/// Expired tokens resolve to `None`, same as unknown ones.
pub async fn find_valid(
    pool: &PgPool,
    token: Uuid,
) -> Result<Option<CheckoutSession>, sqlx::Error> {
    sqlx::query_as::<_, CheckoutSession>(
        "SELECT * FROM checkout_sessions WHERE token = $1 AND expires_at > NOW()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}

//! Customers, keyed by unique normalized email.

use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
}

/// Lower-cased and trimmed; the only form an email is stored in.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Placeholder email for authenticated identities without one.
pub fn synthetic_email(user_id: Uuid) -> String {
    format!("anon-{user_id}@invalid.local")
}

/// Get-or-create on normalized email. The insert is `ON CONFLICT DO
/// NOTHING` followed by a re-read, so two concurrent requests for the same
/// email converge on one row; reuse wins over uniqueness rejection. A known
/// user id is linked onto a customer that has none.
pub async fn get_or_create(
    conn: &mut PgConnection,
    email: &str,
    user_id: Option<Uuid>,
) -> Result<Customer, sqlx::Error> {
    let email = normalize_email(email);
    sqlx::query("INSERT INTO customers (id, user_id, email) VALUES ($1, $2, $3) ON CONFLICT (email) DO NOTHING")
        .bind(Uuid::now_v7())
        .bind(user_id)
        .bind(&email)
        .execute(&mut *conn)
        .await?;

    let mut customer =
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE email = $1")
            .bind(&email)
            .fetch_one(&mut *conn)
            .await?;

    if customer.user_id.is_none() {
        if let Some(uid) = user_id {
            sqlx::query("UPDATE customers SET user_id = $2 WHERE id = $1")
                .bind(customer.id)
                .bind(uid)
                .execute(&mut *conn)
                .await?;
            customer.user_id = Some(uid);
        }
    }
    Ok(customer)
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana.Lopez@Example.COM "), "ana.lopez@example.com");
    }

    #[test]
    fn test_synthetic_email_shape() {
        let uid = Uuid::from_u128(7);
        assert!(synthetic_email(uid).ends_with("@invalid.local"));
    }
}

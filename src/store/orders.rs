//! Orders, their immutable lines, and the 1:1 shipping/billing details.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::order::{OrderState, PaymentMethod, PaymentState};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub state: String,
    pub total: Decimal,
    pub payment_method: Option<String>,
    pub payment_state: String,
    pub transaction_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn lifecycle_state(&self) -> Option<OrderState> {
        OrderState::parse(&self.state)
    }

    pub fn payment(&self) -> Option<PaymentState> {
        PaymentState::parse(&self.payment_state)
    }

    /// Derived interop flag; there is no separate paid column.
    pub fn is_paid(&self) -> bool {
        self.payment() == Some(PaymentState::Approved)
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ShippingDetails {
    pub order_id: Uuid,
    pub recipient_name: String,
    pub address: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BillingDetails {
    pub order_id: Uuid,
    pub tax_id: String,
    pub legal_name: String,
    pub business_line: Option<String>,
    pub address: String,
    pub city: String,
}

/// Staff panel row: order plus the customer email it is linked to.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PanelOrder {
    pub id: Uuid,
    pub customer_email: Option<String>,
    pub state: String,
    pub total: Decimal,
    pub payment_state: String,
    pub created_at: DateTime<Utc>,
}

/// Fresh order in state `cart`, unpaid, payment pending.
pub async fn create_cart_order(
    conn: &mut PgConnection,
    customer_id: Option<Uuid>,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "INSERT INTO orders (id, customer_id, state, total, payment_state, created_at, updated_at) \
         VALUES ($1, $2, 'cart', 0, 'pending', NOW(), NOW()) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(customer_id)
    .fetch_one(conn)
    .await
}

pub async fn insert_line(
    conn: &mut PgConnection,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
) -> Result<OrderLine, sqlx::Error> {
    sqlx::query_as::<_, OrderLine>(
        "INSERT INTO order_lines (id, order_id, product_id, quantity, unit_price) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(unit_price)
    .fetch_one(conn)
    .await
}

pub async fn set_total(
    conn: &mut PgConnection,
    order_id: Uuid,
    total: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE orders SET total = $2, updated_at = NOW() WHERE id = $1")
        .bind(order_id)
        .bind(total)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn lines(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderLine>, sqlx::Error> {
    sqlx::query_as::<_, OrderLine>("SELECT * FROM order_lines WHERE order_id = $1")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

pub async fn shipping(
    pool: &PgPool,
    order_id: Uuid,
) -> Result<Option<ShippingDetails>, sqlx::Error> {
    sqlx::query_as::<_, ShippingDetails>("SELECT * FROM shipping_details WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await
}

pub async fn billing(
    pool: &PgPool,
    order_id: Uuid,
) -> Result<Option<BillingDetails>, sqlx::Error> {
    sqlx::query_as::<_, BillingDetails>("SELECT * FROM billing_details WHERE order_id = $1")
        .bind(order_id)
        .fetch_optional(pool)
        .await
}

/// Detail-collection commit: customer, method, surcharged total, and the
/// transition to `pending_payment` in one statement.
pub async fn finalize_details(
    conn: &mut PgConnection,
    order_id: Uuid,
    customer_id: Uuid,
    method: PaymentMethod,
    total: Decimal,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "UPDATE orders SET customer_id = $2, payment_method = $3, total = $4, \
         state = 'pending_payment', payment_state = 'pending', updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(customer_id)
    .bind(method.as_str())
    .bind(total)
    .fetch_one(conn)
    .await
}

pub async fn upsert_shipping(
    conn: &mut PgConnection,
    order_id: Uuid,
    recipient_name: &str,
    address: &str,
    city: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO shipping_details (order_id, recipient_name, address, city) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (order_id) DO UPDATE SET recipient_name = $2, address = $3, city = $4",
    )
    .bind(order_id)
    .bind(recipient_name)
    .bind(address)
    .bind(city)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn upsert_billing(
    conn: &mut PgConnection,
    order_id: Uuid,
    tax_id: &str,
    legal_name: &str,
    business_line: Option<&str>,
    address: &str,
    city: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO billing_details (order_id, tax_id, legal_name, business_line, address, city) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (order_id) DO UPDATE SET tax_id = $2, legal_name = $3, \
         business_line = $4, address = $5, city = $6",
    )
    .bind(order_id)
    .bind(tax_id)
    .bind(legal_name)
    .bind(business_line)
    .bind(address)
    .bind(city)
    .execute(conn)
    .await?;
    Ok(())
}

/// Payment-callback write: payment state always, lifecycle state and
/// transaction reference only when supplied. The lifecycle write is
/// further gated to pre-fulfillment states, mirroring
/// [`OrderState::approval_marks_paid`]: a replayed success callback must
/// not drag a shipped or delivered order back to `paid`.
pub async fn record_payment(
    pool: &PgPool,
    order_id: Uuid,
    payment: PaymentState,
    state: Option<OrderState>,
    transaction_ref: Option<&str>,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "UPDATE orders SET payment_state = $2, \
         state = CASE WHEN $3::text IS NOT NULL AND state IN ('cart', 'pending_payment') \
                      THEN $3 ELSE state END, \
         transaction_ref = COALESCE($4, transaction_ref), updated_at = NOW() \
         WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(payment.as_str())
    .bind(state.map(|s| s.as_str()))
    .bind(transaction_ref)
    .fetch_one(pool)
    .await
}

pub async fn set_state(
    pool: &PgPool,
    order_id: Uuid,
    state: OrderState,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "UPDATE orders SET state = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(state.as_str())
    .fetch_one(pool)
    .await
}

/// Staff panel listing: only post-payment states, newest first, with an
/// optional exact-state filter and an id-prefix/email search.
pub async fn list_panel(
    pool: &PgPool,
    state: Option<OrderState>,
    search: Option<&str>,
) -> Result<Vec<PanelOrder>, sqlx::Error> {
    let pattern = search.map(|q| format!("%{}%", q.trim()));
    sqlx::query_as::<_, PanelOrder>(
        "SELECT o.id, c.email AS customer_email, o.state, o.total, o.payment_state, o.created_at \
         FROM orders o LEFT JOIN customers c ON c.id = o.customer_id \
         WHERE o.state IN ('paid', 'shipped', 'delivered', 'failed') \
           AND ($1::text IS NULL OR o.state = $1) \
           AND ($2::text IS NULL OR o.id::text ILIKE $2 OR COALESCE(c.email, '') ILIKE $2) \
         ORDER BY o.created_at DESC",
    )
    .bind(state.map(|s| s.as_str()))
    .bind(pattern)
    .fetch_all(pool)
    .await
}

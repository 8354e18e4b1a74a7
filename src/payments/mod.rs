//! Payment lifecycle driver: signed callback URLs and the state writes
//! each callback kind performs.

pub mod gateway;
pub mod sign;

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::order::{OrderState, PaymentState};
use crate::error::AppResult;
use crate::notify::{Mailer, Template};
use crate::store::{self, customers, orders, CheckoutSession};
use self::gateway::BackUrls;

/// Callback URLs for one checkout token, each carrying the token, a
/// timestamp and an HMAC signature over both.
pub fn back_urls(config: &Config, token: Uuid) -> Option<BackUrls> {
    let ts = Utc::now().timestamp();
    let sig = sign::sign_callback(&config.callback_secret, token, ts)?;
    let url = |kind: &str| {
        format!(
            "{}/api/v1/payments/callback/{kind}?token={token}&ts={ts}&sig={sig}",
            config.public_base_url
        )
    };
    Some(BackUrls {
        success: url("success"),
        failure: url("failure"),
        pending: url("pending"),
    })
}

/// Approved callback: payment approved, order `paid`, transaction
/// reference recorded (synthetic fallback), notification sent, originating
/// cart cleared. Deliberately not idempotent: a replayed callback
/// re-executes the payment effects. The lifecycle write only lands on
/// pre-fulfillment states, so a replay never undoes a staff transition.
pub async fn approve(
    pool: &PgPool,
    mailer: &Mailer,
    checkout: &CheckoutSession,
    payment_ref: Option<&str>,
    fallback_prefix: &str,
) -> AppResult<store::Order> {
    let synthetic = format!("{fallback_prefix}-{}", checkout.order_id);
    let reference = payment_ref.filter(|r| !r.is_empty()).unwrap_or(&synthetic);

    let order = orders::record_payment(
        pool,
        checkout.order_id,
        PaymentState::Approved,
        Some(OrderState::Paid),
        Some(reference),
    )
    .await?;

    store::clear_cart(pool, &checkout.session_id).await?;

    if let Some(customer_id) = order.customer_id {
        if let Some(customer) = customers::get(pool, customer_id).await? {
            let context = HashMap::from([
                ("order_id".to_string(), order.id.to_string()),
                ("total".to_string(), order.total.to_string()),
            ]);
            mailer.send(
                customer.email,
                format!("Order {} confirmed", order.id),
                Template::OrderPaid,
                context,
            );
        }
    }

    tracing::info!(order_id = %order.id, reference, "payment approved");
    Ok(order)
}

/// Rejected callback: payment state only; the order stays in
/// `pending_payment`.
pub async fn reject(pool: &PgPool, checkout: &CheckoutSession) -> AppResult<store::Order> {
    let order =
        orders::record_payment(pool, checkout.order_id, PaymentState::Rejected, None, None).await?;
    tracing::info!(order_id = %order.id, "payment rejected");
    Ok(order)
}

/// Pending callback: payment state only, no further effect.
pub async fn pending(pool: &PgPool, checkout: &CheckoutSession) -> AppResult<store::Order> {
    let order =
        orders::record_payment(pool, checkout.order_id, PaymentState::Pending, None, None).await?;
    tracing::info!(order_id = %order.id, "payment pending");
    Ok(order)
}

//! Order builder: one-shot conversion of a non-empty cart into a
//! persisted order, then detail collection that arms it for payment.

pub mod forms;

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::money;
use crate::domain::order::PaymentMethod;
use crate::error::{AppError, AppResult};
use crate::store::{self, customers, orders, products, sessions};
use self::forms::CheckoutDetailsForm;

#[derive(Debug, Deserialize)]
pub struct BeginCheckoutRequest {
    pub session_id: String,
    /// Authenticated identity, resolved upstream; both optional for guests.
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
}

#[derive(Debug)]
pub struct BeginOutcome {
    pub checkout: store::CheckoutSession,
    pub order: store::Order,
}

/// Step 1: materialize the cart as an order in state `cart`.
///
/// Every cart line is re-checked against the live product inside the build
/// transaction: deleted or deactivated products are dropped (as the cart
/// view does), a quantity above current stock refuses the whole build.
/// Prices stay the cart's add-time snapshot. Stock is not decremented.
pub async fn begin(
    pool: &PgPool,
    config: &Config,
    req: BeginCheckoutRequest,
) -> AppResult<BeginOutcome> {
    let cart = store::load_cart(pool, &req.session_id).await?;
    if cart.count() == 0 {
        return Err(AppError::business("cart is empty"));
    }

    let mut tx = pool.begin().await?;

    let customer_id = match req.user_id {
        Some(user_id) => {
            let email = req
                .email
                .as_deref()
                .map(customers::normalize_email)
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| customers::synthetic_email(user_id));
            Some(
                customers::get_or_create(&mut tx, &email, Some(user_id))
                    .await?
                    .id,
            )
        }
        None => None,
    };

    let mut order = orders::create_cart_order(&mut tx, customer_id).await?;

    let ids: Vec<Uuid> = cart.lines().map(|l| l.product_id).collect();
    let live: HashMap<Uuid, products::Product> = products::get_many(&mut *tx, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut total = Decimal::ZERO;
    let mut kept = 0u32;
    for line in cart.lines() {
        let Some(product) = live.get(&line.product_id) else {
            continue;
        };
        if !product.active {
            continue;
        }
        if line.quantity as i64 > product.stock as i64 {
            return Err(AppError::business(format!(
                "Only {} units of \u{201c}{}\u{201d} are available.",
                product.stock, product.name
            )));
        }
        orders::insert_line(
            &mut tx,
            order.id,
            line.product_id,
            line.quantity as i32,
            line.unit_price,
        )
        .await?;
        total += line.line_total();
        kept += 1;
    }
    if kept == 0 {
        return Err(AppError::business("cart is empty"));
    }

    orders::set_total(&mut tx, order.id, total).await?;
    order.total = total;

    let checkout = sessions::create(&mut tx, &req.session_id, order.id, config.checkout_ttl).await?;
    tx.commit().await?;

    tracing::info!(order_id = %order.id, total = %total, "checkout started");
    Ok(BeginOutcome { checkout, order })
}

/// Step 2: validate the detail form, commit customer + surcharged total +
/// shipping (and billing when the invoice flag is set) in one transaction,
/// and report which gateway entry point to route to.
pub async fn submit_details(
    pool: &PgPool,
    config: &Config,
    token: Uuid,
    form: CheckoutDetailsForm,
) -> AppResult<(store::CheckoutSession, store::Order, PaymentMethod)> {
    let Some(checkout) = sessions::find_valid(pool, token).await? else {
        return Err(AppError::business("no checkout in progress"));
    };
    let order = orders::get(pool, checkout.order_id)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    if order.is_paid() {
        return Err(AppError::business("order is already paid"));
    }

    let details = form.validated().map_err(AppError::Validation)?;

    // Subtotal from the frozen lines, so re-submitting the form never
    // compounds an earlier surcharge.
    let subtotal: Decimal = orders::lines(pool, order.id)
        .await?
        .iter()
        .map(|l| money::line_total(l.unit_price, l.quantity.max(0) as u32))
        .sum();
    let total = money::checkout_total(subtotal, config.surcharge_rate(details.method));

    let mut tx = pool.begin().await?;
    let customer = customers::get_or_create(&mut tx, &details.email, None).await?;
    let order = orders::finalize_details(&mut tx, order.id, customer.id, details.method, total).await?;
    orders::upsert_shipping(
        &mut tx,
        order.id,
        &details.shipping.recipient_name,
        &details.shipping.address,
        &details.shipping.city,
    )
    .await?;
    if let Some(billing) = &details.billing {
        orders::upsert_billing(
            &mut tx,
            order.id,
            &billing.tax_id,
            &billing.legal_name,
            billing.business_line.as_deref(),
            &billing.address,
            &billing.city,
        )
        .await?;
    }
    tx.commit().await?;

    tracing::info!(
        order_id = %order.id,
        method = details.method.as_str(),
        total = %total,
        "order pending payment"
    );
    Ok((checkout, order, details.method))
}

//! axum routing and the request boundaries.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod payments;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::notify::Mailer;
use crate::payments::gateway::Gateway;
use crate::store::Order;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub gateway: Gateway,
    pub mailer: Mailer,
}

/// Order as the API serializes it: row fields plus the derived paid flag.
#[derive(Debug, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    order: Order,
    paid: bool,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let paid = order.is_paid();
        Self { order, paid }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront"})) }),
        )
        .route("/api/v1/products", get(catalog::list_products))
        .route("/api/v1/products/:id", get(catalog::get_product))
        .route(
            "/api/v1/cart/:session",
            get(cart::view_cart).delete(cart::clear_cart),
        )
        .route("/api/v1/cart/:session/items", post(cart::add_item))
        .route(
            "/api/v1/cart/:session/items/:product_id",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/api/v1/checkout/begin", post(checkout::begin_checkout))
        .route("/api/v1/checkout/:token/details", post(checkout::submit_details))
        .route("/api/v1/payments/callback/success", get(payments::callback_success))
        .route("/api/v1/payments/callback/failure", get(payments::callback_failure))
        .route("/api/v1/payments/callback/pending", get(payments::callback_pending))
        .route("/api/v1/admin/products", post(admin::create_product))
        .route("/api/v1/admin/products/bulk", post(admin::bulk_products))
        .route("/api/v1/admin/products/:id", put(admin::update_product))
        .route("/api/v1/admin/orders", get(admin::list_orders))
        .route("/api/v1/admin/orders/:id", get(admin::order_detail))
        .route("/api/v1/admin/orders/:id/state", post(admin::change_order_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

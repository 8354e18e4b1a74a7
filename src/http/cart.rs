//! Cart endpoints. This is the boundary that enforces the stock policy;
//! the cart itself stays stock-agnostic.
//!
//! Policy refusals are not errors: the request succeeds with the cart
//! unchanged and a `warning` on the payload.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::{self, Cart, CartAction, CartMutation};
use crate::error::{AppError, AppResult};
use crate::store::{self, products};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: Uuid,
    pub name: String,
    pub active: bool,
    pub stock: i32,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub session_id: String,
    pub lines: Vec<CartLineView>,
    pub count: u32,
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Materialize line views by joining each snapshot against the live
/// product. Products that no longer resolve are silently excluded; `count`
/// and `total` still come from the stored mapping.
async fn render_cart(
    state: &AppState,
    cart: &Cart,
    message: Option<String>,
    warning: Option<String>,
) -> AppResult<CartView> {
    let ids: Vec<Uuid> = cart.lines().map(|l| l.product_id).collect();
    let live: HashMap<Uuid, products::Product> = products::get_many(&state.db, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let lines = cart
        .lines()
        .filter_map(|line| {
            live.get(&line.product_id).map(|product| CartLineView {
                product_id: line.product_id,
                name: product.name.clone(),
                active: product.active,
                stock: product.stock,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total(),
            })
        })
        .collect();

    Ok(CartView {
        session_id: cart.session_id().to_string(),
        lines,
        count: cart.count(),
        total: cart.total(),
        message,
        warning,
    })
}

pub async fn view_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> AppResult<Json<CartView>> {
    let cart = store::load_cart(&state.db, &session).await?;
    Ok(Json(render_cart(&state, &cart, None, None).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: Option<u32>,
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(session): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> AppResult<Json<CartView>> {
    let product = products::get(&state.db, req.product_id)
        .await?
        .ok_or(AppError::NotFound("product"))?;
    let mut cart = store::load_cart(&state.db, &session).await?;

    let requested = req.quantity.unwrap_or(1);
    let existing = cart.quantity_of(product.id);
    let view = match cart::stock_policy(CartAction::Add, &product.name, product.stock, existing, requested)
    {
        CartMutation::Apply { quantity, warning } => {
            cart.add(product.id, product.price, quantity, false);
            store::save_cart(&state.db, &cart).await?;
            let message = format!("\u{201c}{}\u{201d} was added to the cart.", product.name);
            render_cart(&state, &cart, Some(message), warning).await?
        }
        CartMutation::Reject { warning } => render_cart(&state, &cart, None, Some(warning)).await?,
    };
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

pub async fn update_item(
    State(state): State<AppState>,
    Path((session, product_id)): Path<(String, Uuid)>,
    Json(req): Json<UpdateItemRequest>,
) -> AppResult<Json<CartView>> {
    let product = products::get(&state.db, product_id)
        .await?
        .ok_or(AppError::NotFound("product"))?;
    let mut cart = store::load_cart(&state.db, &session).await?;

    let existing = cart.quantity_of(product.id);
    let view = match cart::stock_policy(
        CartAction::Update,
        &product.name,
        product.stock,
        existing,
        req.quantity,
    ) {
        CartMutation::Apply { quantity, warning } => {
            cart.add(product.id, product.price, quantity, true);
            store::save_cart(&state.db, &cart).await?;
            let message = warning
                .is_none()
                .then(|| format!("Quantity of \u{201c}{}\u{201d} was updated.", product.name));
            render_cart(&state, &cart, message, warning).await?
        }
        CartMutation::Reject { warning } => render_cart(&state, &cart, None, Some(warning)).await?,
    };
    Ok(Json(view))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((session, product_id)): Path<(String, Uuid)>,
) -> AppResult<Json<CartView>> {
    let mut cart = store::load_cart(&state.db, &session).await?;
    cart.remove(product_id);
    store::save_cart(&state.db, &cart).await?;
    Ok(Json(
        render_cart(&state, &cart, Some("Item removed from the cart.".to_string()), None).await?,
    ))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> AppResult<Json<CartView>> {
    store::clear_cart(&state.db, &session).await?;
    let cart = Cart::new(session);
    Ok(Json(render_cart(&state, &cart, Some("Cart emptied.".to_string()), None).await?))
}

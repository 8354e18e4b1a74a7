//! Staff administration endpoints: product management and order
//! fulfillment. Authentication happens upstream; these handlers assume a
//! staff caller.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::order::OrderState;
use crate::error::{AppError, AppResult};
use crate::store::orders::{BillingDetails, ShippingDetails};
use crate::store::products::{DeleteOutcome, ProductInput};
use crate::store::{customers, orders, products, OrderLine, PanelOrder, Product};

use super::{AppState, OrderView};

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = products::create(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    products::update(&state.db, id, &input)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("product"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub action: BulkAction,
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SkippedItem {
    pub id: Uuid,
    pub reason: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub processed: u64,
    pub skipped: Vec<SkippedItem>,
}

/// Bulk product actions. Deletes are guarded: a product with order lines
/// is refused by referential integrity and reported as skipped instead of
/// failing the whole batch.
pub async fn bulk_products(
    State(state): State<AppState>,
    Json(req): Json<BulkRequest>,
) -> AppResult<Json<BulkResponse>> {
    let response = match req.action {
        BulkAction::Activate => BulkResponse {
            processed: products::set_active(&state.db, &req.ids, true).await?,
            skipped: vec![],
        },
        BulkAction::Deactivate => BulkResponse {
            processed: products::set_active(&state.db, &req.ids, false).await?,
            skipped: vec![],
        },
        BulkAction::Delete => {
            let mut processed = 0;
            let mut skipped = vec![];
            for id in req.ids {
                match products::delete(&state.db, id).await? {
                    DeleteOutcome::Deleted => processed += 1,
                    DeleteOutcome::Missing => skipped.push(SkippedItem { id, reason: "not found" }),
                    DeleteOutcome::Blocked => {
                        skipped.push(SkippedItem { id, reason: "has order lines" })
                    }
                }
            }
            BulkResponse { processed, skipped }
        }
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct PanelParams {
    pub state: Option<String>,
    pub q: Option<String>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<PanelParams>,
) -> AppResult<Json<Vec<PanelOrder>>> {
    // An unknown filter value means "all panel states", same as no filter.
    let filter = params.state.as_deref().and_then(OrderState::parse);
    let orders = orders::list_panel(&state.db, filter, params.q.as_deref()).await?;
    Ok(Json(orders))
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub order: OrderView,
    pub customer_email: Option<String>,
    pub lines: Vec<OrderLine>,
    pub shipping: Option<ShippingDetails>,
    pub billing: Option<BillingDetails>,
}

pub async fn order_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderDetailResponse>> {
    let order = orders::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    let customer_email = match order.customer_id {
        Some(customer_id) => customers::get(&state.db, customer_id)
            .await?
            .map(|c| c.email),
        None => None,
    };
    let lines = orders::lines(&state.db, id).await?;
    let shipping = orders::shipping(&state.db, id).await?;
    let billing = orders::billing(&state.db, id).await?;
    Ok(Json(OrderDetailResponse {
        order: order.into(),
        customer_email,
        lines,
        shipping,
        billing,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ChangeStateRequest {
    pub state: String,
}

/// Fulfillment transition, checked against the lifecycle allow-list. A
/// rejected transition leaves the order untouched.
pub async fn change_order_state(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeStateRequest>,
) -> AppResult<Json<OrderView>> {
    let order = orders::get(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    let current = order
        .lifecycle_state()
        .ok_or_else(|| AppError::business("order has an unknown state"))?;
    let next = OrderState::parse(&req.state)
        .ok_or_else(|| AppError::business(format!("unknown state \u{201c}{}\u{201d}", req.state)))?;

    if !current.can_transition_to(next) {
        return Err(AppError::business("state change not allowed for this order"));
    }

    let order = orders::set_state(&state.db, id, next).await?;
    tracing::info!(order_id = %id, from = current.as_str(), to = next.as_str(), "order state changed");
    Ok(Json(order.into()))
}

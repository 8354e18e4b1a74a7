//! Payment callback endpoints. Each one verifies the URL signature before
//! touching any state, then correlates to the in-progress order through
//! the checkout token.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::payments::{self, sign};
use crate::store::{sessions, CheckoutSession};

use super::{AppState, OrderView};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub token: Uuid,
    pub ts: i64,
    pub sig: String,
    pub payment_id: Option<String>,
}

async fn authenticate(state: &AppState, params: &CallbackParams) -> AppResult<CheckoutSession> {
    if !sign::verify_callback(
        &state.config.callback_secret,
        params.token,
        params.ts,
        &params.sig,
    ) {
        return Err(AppError::BadSignature);
    }
    sessions::find_valid(&state.db, params.token)
        .await?
        .ok_or_else(|| AppError::business("no checkout in progress"))
}

pub async fn callback_success(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state, &params).await?;
    let order = payments::approve(
        &state.db,
        &state.mailer,
        &session,
        params.payment_id.as_deref(),
        "mp-sim",
    )
    .await?;
    Ok(Json(json!({ "status": "approved", "order": OrderView::from(order) })))
}

pub async fn callback_failure(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state, &params).await?;
    let order = payments::reject(&state.db, &session).await?;
    Ok(Json(json!({ "status": "rejected", "order": OrderView::from(order) })))
}

pub async fn callback_pending(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> AppResult<Json<serde_json::Value>> {
    let session = authenticate(&state, &params).await?;
    let order = payments::pending(&state.db, &session).await?;
    Ok(Json(json!({ "status": "pending", "order": OrderView::from(order) })))
}

//! Checkout endpoints: the two order-builder steps plus routing to the
//! gateway entry point for the chosen method.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::checkout::{self, forms::CheckoutDetailsForm, BeginCheckoutRequest};
use crate::domain::order::PaymentMethod;
use crate::error::{AppError, AppResult};
use crate::payments;

use super::{AppState, OrderView};

#[derive(Debug, Serialize)]
pub struct BeginResponse {
    pub checkout_token: Uuid,
    pub expires_at: DateTime<Utc>,
    pub order: OrderView,
}

pub async fn begin_checkout(
    State(state): State<AppState>,
    Json(req): Json<BeginCheckoutRequest>,
) -> AppResult<(StatusCode, Json<BeginResponse>)> {
    let outcome = checkout::begin(&state.db, &state.config, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(BeginResponse {
            checkout_token: outcome.checkout.token,
            expires_at: outcome.checkout.expires_at,
            order: outcome.order.into(),
        }),
    ))
}

pub async fn submit_details(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(form): Json<CheckoutDetailsForm>,
) -> AppResult<Json<serde_json::Value>> {
    let (session, order, method) =
        checkout::submit_details(&state.db, &state.config, token, form).await?;

    match method {
        PaymentMethod::MercadoPago => {
            let urls = payments::back_urls(&state.config, session.token)
                .ok_or_else(|| AppError::Gateway("could not sign callback URLs".to_string()))?;
            let redirect_url = state
                .gateway
                .create_redirect(order.id, order.total, &state.config.currency, &urls)
                .await?;
            Ok(Json(json!({ "status": "redirect", "redirect_url": redirect_url })))
        }
        // No live integration for this provider: approve immediately with a
        // synthetic transaction reference.
        PaymentMethod::Webpay => {
            let order =
                payments::approve(&state.db, &state.mailer, &session, None, "tbk-sim").await?;
            Ok(Json(json!({ "status": "approved", "order": OrderView::from(order) })))
        }
    }
}

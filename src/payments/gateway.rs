//! Redirect-based payment gateway client.
//!
//! The gateway receives an opaque order reference, the payable total and
//! three callback URLs, and answers with a checkout URL to redirect the
//! shopper to. Timeouts, non-2xx answers and missing fields are hard
//! failures surfaced with the provider's detail, never retried.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

#[derive(Clone)]
pub struct Gateway {
    http: reqwest::Client,
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(http: reqwest::Client, config: GatewayConfig) -> Self {
        Self { http, config }
    }

    /// Create a payment preference and return the URL to redirect to.
    pub async fn create_redirect(
        &self,
        order_id: Uuid,
        total: Decimal,
        currency: &str,
        back_urls: &BackUrls,
    ) -> AppResult<String> {
        let access_token = self
            .config
            .access_token
            .as_deref()
            .ok_or_else(|| AppError::Gateway("access token not configured".to_string()))?;
        let unit_price = total
            .to_f64()
            .ok_or_else(|| AppError::Gateway(format!("total {total} is not representable")))?;

        let body = json!({
            "items": [{
                "title": format!("Order {order_id}"),
                "quantity": 1,
                "currency_id": currency,
                "unit_price": unit_price,
            }],
            "back_urls": {
                "success": back_urls.success,
                "failure": back_urls.failure,
                "pending": back_urls.pending,
            },
            "auto_return": "approved",
        });

        let response = self
            .http
            .post(format!("{}/checkout/preferences", self.config.base_url))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Gateway(format!("returned {status}: {detail}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("malformed response: {e}")))?;

        payload["init_point"]
            .as_str()
            .or_else(|| payload["sandbox_init_point"].as_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::Gateway(format!("no checkout URL in response: {payload}")))
    }
}

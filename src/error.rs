//! Request-scoped error taxonomy.
//!
//! Nothing here is fatal to the process: validation failures carry
//! field-level messages, business-rule refusals leave state untouched,
//! gateway failures surface the provider's diagnostic verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing form input; no state mutation.
    #[error("validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// Business-rule refusal: empty cart, invalid transition, stale
    /// checkout token, insufficient stock at build time.
    #[error("{0}")]
    BusinessRule(String),

    /// Stale or foreign identifier.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Payment callback with a missing or invalid signature.
    #[error("invalid callback signature")]
    BadSignature,

    /// Payment gateway unreachable or malformed response; never retried.
    #[error("payment gateway error: {0}")]
    Gateway(String),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl AppError {
    pub fn business(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(errors) => {
                let fields: serde_json::Map<String, serde_json::Value> = errors
                    .field_errors()
                    .iter()
                    .map(|(field, errs)| {
                        let messages: Vec<String> = errs
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            })
                            .collect();
                        (field.to_string(), json!(messages))
                    })
                    .collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "error": "validation failed", "fields": fields }),
                )
            }
            AppError::BusinessRule(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{what} not found") }),
            ),
            AppError::BadSignature => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "invalid callback signature" }),
            ),
            AppError::Gateway(detail) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": format!("payment gateway error: {detail}") }),
            ),
            AppError::Db(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rule_is_conflict() {
        let resp = AppError::business("cart is empty").into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_gateway_is_bad_gateway() {
        let resp = AppError::Gateway("timed out".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}

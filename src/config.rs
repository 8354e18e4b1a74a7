//! Environment-driven configuration, loaded once at startup.

use anyhow::Context;
use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::order::PaymentMethod;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Base URL this service is reachable at; used to build callback URLs.
    pub public_base_url: String,
    pub gateway: GatewayConfig,
    /// HMAC key for signing the payment callback URLs.
    pub callback_secret: String,
    pub mailgun: Option<MailgunConfig>,
    pub surcharge_webpay: Decimal,
    pub surcharge_mercadopago: Decimal,
    pub checkout_ttl: Duration,
    pub currency: String,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base_url: String,
    pub access_token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct MailgunConfig {
    pub api_key: String,
    pub domain: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8083".to_string())
            .parse()
            .context("PORT must be a number")?;
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));
        let callback_secret =
            std::env::var("CALLBACK_SECRET").context("CALLBACK_SECRET is not set")?;

        let mailgun = match (
            std::env::var("MAILGUN_API_KEY").ok(),
            std::env::var("MAILGUN_DOMAIN").ok(),
        ) {
            (Some(api_key), Some(domain)) => Some(MailgunConfig {
                from: std::env::var("FROM_EMAIL")
                    .unwrap_or_else(|_| format!("no-reply@{domain}")),
                api_key,
                domain,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            port,
            public_base_url,
            gateway: GatewayConfig {
                base_url: std::env::var("MP_BASE_URL")
                    .unwrap_or_else(|_| "https://api.mercadopago.com".to_string()),
                access_token: std::env::var("MP_ACCESS_TOKEN").ok(),
            },
            callback_secret,
            mailgun,
            surcharge_webpay: decimal_env("SURCHARGE_WEBPAY", dec!(0.03))?,
            surcharge_mercadopago: decimal_env("SURCHARGE_MERCADOPAGO", dec!(0.04))?,
            checkout_ttl: Duration::minutes(
                std::env::var("CHECKOUT_TTL_MINUTES")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("CHECKOUT_TTL_MINUTES must be a number")?,
            ),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "CLP".to_string()),
        })
    }

    /// Method-specific surcharge rate applied on top of the order subtotal.
    pub fn surcharge_rate(&self, method: PaymentMethod) -> Decimal {
        match method {
            PaymentMethod::Webpay => self.surcharge_webpay,
            PaymentMethod::MercadoPago => self.surcharge_mercadopago,
        }
    }
}

fn decimal_env(key: &str, default: Decimal) -> anyhow::Result<Decimal> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<Decimal>()
            .with_context(|| format!("{key} must be a decimal rate")),
        Err(_) => Ok(default),
    }
}

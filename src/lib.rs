//! Storefront service
//!
//! Catalog, session-scoped cart, checkout and order fulfillment backed by
//! PostgreSQL, with a redirect-based payment gateway and a templated mail
//! sink as external collaborators.
//!
//! ## Layout
//! - `domain`: pure pricing, cart and order-lifecycle rules
//! - `store`: sqlx repositories over the relational schema
//! - `checkout`: two-step order builder (cart to pending-payment order)
//! - `payments`: gateway client, signed callbacks, lifecycle driver
//! - `http`: axum routing and request boundaries

pub mod checkout;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod notify;
pub mod payments;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult};

//! sqlx repositories over the relational schema.
//!
//! Read paths take the pool; anything that participates in a checkout
//! transaction takes `&mut PgConnection` so callers control the boundary.

pub mod carts;
pub mod customers;
pub mod orders;
pub mod products;
pub mod sessions;

pub use carts::{clear_cart, load_cart, save_cart};
pub use customers::Customer;
pub use orders::{Order, OrderLine, PanelOrder};
pub use products::Product;
pub use sessions::CheckoutSession;

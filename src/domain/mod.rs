//! Pure domain rules: pricing, cart arithmetic and the order lifecycle.

pub mod cart;
pub mod money;
pub mod order;

pub use cart::{Cart, CartAction, CartLine, CartMutation};
pub use order::{OrderState, PaymentMethod, PaymentState};

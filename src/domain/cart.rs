//! Session-scoped cart: purchase intent accumulated before an order exists.
//!
//! The cart is a mapping from product id to a quantity plus a unit-price
//! snapshot taken when the line is first inserted. It is stock-agnostic by
//! design; the stock-and-quantity policy lives in [`stock_policy`] and is
//! enforced by the request boundary, not here.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::money;

#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: u32,
    /// Price frozen when the line was first added; it can drift from the
    /// live catalog price until the line is re-added or the order is built.
    pub unit_price: Decimal,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        money::line_total(self.unit_price, self.quantity)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    session_id: String,
    lines: BTreeMap<Uuid, CartLine>,
}

impl Cart {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), lines: BTreeMap::new() }
    }

    pub fn from_lines(session_id: impl Into<String>, lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new(session_id);
        cart.lines = lines.into_iter().map(|l| (l.product_id, l)).collect();
        cart
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
        self.lines.get(&product_id)
    }

    pub fn quantity_of(&self, product_id: Uuid) -> u32 {
        self.lines.get(&product_id).map(|l| l.quantity).unwrap_or(0)
    }

    /// Insert-or-accumulate. An absent product gets a fresh line at
    /// quantity 0 with `unit_price` as its snapshot; an existing line keeps
    /// its original snapshot. `override_quantity` replaces instead of
    /// incrementing.
    pub fn add(&mut self, product_id: Uuid, unit_price: Decimal, quantity: u32, override_quantity: bool) {
        let line = self
            .lines
            .entry(product_id)
            .or_insert(CartLine { product_id, quantity: 0, unit_price });
        if override_quantity {
            line.quantity = quantity;
        } else {
            line.quantity = line.quantity.saturating_add(quantity);
        }
    }

    /// Deletes the line if present; silent no-op otherwise.
    pub fn remove(&mut self, product_id: Uuid) {
        self.lines.remove(&product_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total item count: sum of quantities, not distinct lines.
    pub fn count(&self) -> u32 {
        self.lines.values().map(|l| l.quantity).sum()
    }

    /// Sum of snapshot-price subtotals, never the live catalog price.
    pub fn total(&self) -> Decimal {
        self.lines.values().map(|l| l.line_total()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CartAction {
    Add,
    Update,
}

/// Outcome of applying the boundary stock policy to a requested mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum CartMutation {
    /// Proceed with `quantity` (the raw request for adds, possibly clamped
    /// for updates), optionally carrying a user-facing warning.
    Apply { quantity: u32, warning: Option<String> },
    /// Leave the cart untouched and surface the warning.
    Reject { warning: String },
}

/// Stock-and-quantity policy enforced at the request boundary.
///
/// The requested quantity is clamped to at least 1. Zero stock refuses the
/// mutation outright. Beyond that the add and update paths diverge on
/// purpose: an add that would push the line past available stock is refused
/// entirely, while an update above stock is clamped down to it.
pub fn stock_policy(
    action: CartAction,
    product_name: &str,
    stock: i32,
    existing_quantity: u32,
    requested: u32,
) -> CartMutation {
    let requested = requested.max(1);

    if stock <= 0 {
        return CartMutation::Reject {
            warning: format!("\u{201c}{product_name}\u{201d} has no stock available."),
        };
    }
    let stock = stock as u32;

    match action {
        CartAction::Add => {
            // Saturating: a huge requested quantity must land in the
            // reject branch, not wrap around the stock check.
            if existing_quantity.saturating_add(requested) > stock {
                CartMutation::Reject {
                    warning: format!(
                        "You cannot add more than {stock} units of \u{201c}{product_name}\u{201d}."
                    ),
                }
            } else {
                CartMutation::Apply { quantity: requested, warning: None }
            }
        }
        CartAction::Update => {
            if requested > stock {
                CartMutation::Apply {
                    quantity: stock,
                    warning: Some(format!(
                        "Only {stock} units of \u{201c}{product_name}\u{201d} are available; quantity was adjusted."
                    )),
                }
            } else {
                CartMutation::Apply { quantity: requested, warning: None }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pid(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    #[test]
    fn test_add_accumulates_and_snapshots_price() {
        let mut cart = Cart::new("s1");
        cart.add(pid(1), dec!(1000), 2, false);
        cart.add(pid(1), dec!(1500), 1, false);
        // Snapshot from the first add survives later adds.
        assert_eq!(cart.line(pid(1)).unwrap().unit_price, dec!(1000));
        assert_eq!(cart.quantity_of(pid(1)), 3);
        assert_eq!(cart.total(), dec!(3000));
    }

    #[test]
    fn test_override_replaces_quantity() {
        let mut cart = Cart::new("s1");
        cart.add(pid(1), dec!(500), 4, false);
        cart.add(pid(1), dec!(500), 2, true);
        assert_eq!(cart.quantity_of(pid(1)), 2);
    }

    #[test]
    fn test_count_is_sum_of_quantities() {
        let mut cart = Cart::new("s1");
        cart.add(pid(1), dec!(100), 2, false);
        cart.add(pid(2), dec!(250), 3, false);
        assert_eq!(cart.count(), 5);
        assert_eq!(cart.total(), dec!(950));
        cart.remove(pid(1));
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.total(), dec!(750));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new("s1");
        cart.add(pid(1), dec!(100), 1, false);
        cart.remove(pid(9));
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn test_clear_empties_mapping() {
        let mut cart = Cart::new("s1");
        cart.add(pid(1), dec!(100), 1, false);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), dec!(0));
    }

    #[test]
    fn test_policy_zero_stock_refuses_both_paths() {
        for action in [CartAction::Add, CartAction::Update] {
            let outcome = stock_policy(action, "Widget", 0, 0, 1);
            assert!(matches!(outcome, CartMutation::Reject { .. }));
        }
    }

    #[test]
    fn test_policy_add_beyond_stock_is_refused() {
        let outcome = stock_policy(CartAction::Add, "Widget", 5, 4, 2);
        assert!(matches!(outcome, CartMutation::Reject { .. }));
    }

    #[test]
    fn test_policy_update_beyond_stock_clamps() {
        let outcome = stock_policy(CartAction::Update, "Widget", 5, 4, 9);
        match outcome {
            CartMutation::Apply { quantity, warning } => {
                assert_eq!(quantity, 5);
                assert!(warning.is_some());
            }
            other => panic!("expected clamp, got {other:?}"),
        }
    }

    #[test]
    fn test_policy_add_near_max_quantity_is_refused() {
        let outcome = stock_policy(CartAction::Add, "Widget", 5, 3, u32::MAX - 1);
        assert!(matches!(outcome, CartMutation::Reject { .. }));
    }

    #[test]
    fn test_add_saturates_instead_of_wrapping() {
        let mut cart = Cart::new("s1");
        cart.add(pid(1), dec!(100), 3, false);
        cart.add(pid(1), dec!(100), u32::MAX - 1, false);
        assert_eq!(cart.quantity_of(pid(1)), u32::MAX);
    }

    #[test]
    fn test_policy_clamps_requested_to_at_least_one() {
        let outcome = stock_policy(CartAction::Add, "Widget", 10, 0, 0);
        assert_eq!(outcome, CartMutation::Apply { quantity: 1, warning: None });
    }
}

//! Fixed-point currency arithmetic.

use rust_decimal::{Decimal, RoundingStrategy};

/// Subtotal of one line: snapshot unit price times quantity.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Final payable total: subtotal plus the method surcharge, rounded
/// half-to-even to whole currency units. No fractional minor units are
/// retained past this point.
pub fn checkout_total(subtotal: Decimal, surcharge_rate: Decimal) -> Decimal {
    let factor = Decimal::ONE + surcharge_rate;
    (subtotal * factor).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec!(1990), 3), dec!(5970));
    }

    #[test]
    fn test_surcharge_three_percent() {
        assert_eq!(checkout_total(dec!(1000), dec!(0.03)), dec!(1030));
    }

    #[test]
    fn test_zero_rate_keeps_subtotal() {
        assert_eq!(checkout_total(dec!(4990), dec!(0)), dec!(4990));
    }

    #[test]
    fn test_halfway_rounds_to_even() {
        // 50 * 1.05 = 52.5 -> 52, 70 * 1.05 = 73.5 -> 74
        assert_eq!(checkout_total(dec!(50), dec!(0.05)), dec!(52));
        assert_eq!(checkout_total(dec!(70), dec!(0.05)), dec!(74));
    }

    #[test]
    fn test_non_halfway_rounds_nearest() {
        // 1234 * 1.03 = 1271.02
        assert_eq!(checkout_total(dec!(1234), dec!(0.03)), dec!(1271));
    }
}

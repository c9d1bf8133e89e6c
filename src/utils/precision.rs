// src/utils/precision.rs
use rust_decimal::{Decimal, RoundingStrategy};

/// Formats a value with exactly `dp` decimal places, rounding half away from zero.
/// Example: value=1.005, dp=2 -> "1.01"
pub fn to_fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}

/// Fractional move of `price` relative to `reference`: |price - reference| / reference.
/// Returns None when the reference is zero.
pub fn fractional_change(price: Decimal, reference: Decimal) -> Option<Decimal> {
    (price - reference).abs().checked_div(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_fixed_pads_and_rounds() {
        assert_eq!(to_fixed(dec!(899), 2), "899.00");
        assert_eq!(to_fixed(dec!(1.005), 2), "1.01");
        assert_eq!(to_fixed(dec!(0.002), 4), "0.0020");
        assert_eq!(to_fixed(dec!(-0.00005), 4), "-0.0001");
    }

    #[test]
    fn test_fractional_change() {
        assert_eq!(fractional_change(dec!(50100), dec!(50000)), Some(dec!(0.002)));
        assert_eq!(fractional_change(dec!(40000), dec!(50000)), Some(dec!(0.2)));
        assert_eq!(fractional_change(dec!(1), Decimal::ZERO), None);
    }
}

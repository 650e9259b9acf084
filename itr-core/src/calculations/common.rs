//! Rounding and small arithmetic helpers shared by the calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to the nearest whole rupee, halves away from zero.
///
/// Every amount the calculators produce and every line of the return
/// document goes through this function.
///
/// # Arguments
///
/// * `value` - The amount to round
///
/// # Returns
///
/// The amount with no fractional part.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use itr_core::calculations::common::round_to_rupee;
///
/// assert_eq!(round_to_rupee(dec!(1234.49)), dec!(1234));
/// assert_eq!(round_to_rupee(dec!(1234.50)), dec!(1235));
/// assert_eq!(round_to_rupee(dec!(-1234.50)), dec!(-1235));
/// ```
pub fn round_to_rupee(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two values.
///
/// # Arguments
///
/// * `a` - First amount
/// * `b` - Second amount
///
/// # Returns
///
/// The larger of the two amounts.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use itr_core::calculations::common::max;
///
/// assert_eq!(max(dec!(-2500), dec!(0)), dec!(0));
/// assert_eq!(max(dec!(600000), dec!(450000)), dec!(600000));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_to_rupee tests
    // =========================================================================

    #[test]
    fn round_to_rupee_rounds_down_below_midpoint() {
        let result = round_to_rupee(dec!(1299.49));

        assert_eq!(result, dec!(1299));
    }

    #[test]
    fn round_to_rupee_rounds_up_at_midpoint() {
        let result = round_to_rupee(dec!(1299.50));

        assert_eq!(result, dec!(1300));
    }

    #[test]
    fn round_to_rupee_handles_negative_midpoint() {
        let result = round_to_rupee(dec!(-0.5));

        assert_eq!(result, dec!(-1));
    }

    #[test]
    fn round_to_rupee_preserves_whole_values() {
        let result = round_to_rupee(dec!(32500));

        assert_eq!(result, dec!(32500));
    }

    #[test]
    fn round_to_rupee_handles_zero() {
        let result = round_to_rupee(dec!(0.00));

        assert_eq!(result, dec!(0));
    }

    // =========================================================================
    // max tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(100), dec!(200)), dec!(200));
        assert_eq!(max(dec!(200), dec!(100)), dec!(200));
    }

    #[test]
    fn max_handles_negative_values() {
        let result = max(dec!(-50), dec!(0));

        assert_eq!(result, dec!(0));
    }
}

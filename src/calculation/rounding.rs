//! Currency rounding and overflow-checked decimal arithmetic.
//!
//! Intermediate values keep full decimal precision; [`round_currency`] is
//! applied exactly once, when a value leaves the engine.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};
use crate::models::CURRENCY_SCALE;

/// Rounds an amount to centavos, half-up (midpoints away from zero).
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::round_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_currency(Decimal::new(12345, 3)), Decimal::new(1235, 2));
/// assert_eq!(round_currency(Decimal::new(12344, 3)), Decimal::new(1234, 2));
/// ```
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn mul(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| EngineError::overflow(context))
}

pub(crate) fn add(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_add(b).ok_or_else(|| EngineError::overflow(context))
}

pub(crate) fn sub(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| EngineError::overflow(context))
}

pub(crate) fn div(a: Decimal, b: Decimal, context: &str) -> EngineResult<Decimal> {
    a.checked_div(b).ok_or_else(|| EngineError::CalculationError {
        message: format!("invalid division while computing {}", context),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_midpoint_rounds_up() {
        assert_eq!(round_currency(dec("0.005")), dec("0.01"));
        assert_eq!(round_currency(dec("2548.3875")), dec("2548.39"));
    }

    #[test]
    fn test_below_midpoint_rounds_down() {
        assert_eq!(round_currency(dec("0.0049999")), dec("0.00"));
        assert_eq!(round_currency(dec("3672.003008")), dec("3672.00"));
    }

    #[test]
    fn test_round_does_not_use_bankers_rounding() {
        // Banker's rounding would give 0.02 for both.
        assert_eq!(round_currency(dec("0.025")), dec("0.03"));
        assert_eq!(round_currency(dec("0.015")), dec("0.02"));
    }

    #[test]
    fn test_already_rounded_amount_unchanged() {
        assert_eq!(round_currency(dec("25000.00")), dec("25000.00"));
        assert_eq!(round_currency(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_checked_mul_overflow_is_calculation_error() {
        let result = mul(Decimal::MAX, dec("2"), "test");
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_checked_add_overflow_is_calculation_error() {
        let result = add(Decimal::MAX, Decimal::MAX, "test");
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_division_by_zero_is_calculation_error() {
        let result = div(Decimal::ONE, Decimal::ZERO, "test");
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }
}

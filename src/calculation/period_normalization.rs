//! Normalization of period amounts onto the monthly tax table.
//!
//! Income tax tables are published monthly. Every period amount is converted
//! to its monthly equivalent (`amount × periods_per_year / 12`) before the
//! brackets are applied, and the resulting tax is converted back
//! (`monthly_tax × 12 / periods_per_year`). Monthly amounts pass through
//! untouched. No other strategy is used anywhere in the engine.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::PayFrequency;

use super::rounding::{div, mul};

const MONTHS_PER_YEAR: u32 = 12;

/// Converts a period amount to its monthly equivalent.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::to_monthly_equivalent;
/// use payroll_engine::models::PayFrequency;
/// use rust_decimal::Decimal;
///
/// // Twelve thousand a quincena is twenty-four thousand a month.
/// let monthly = to_monthly_equivalent(Decimal::from(12_000), PayFrequency::Semimonthly).unwrap();
/// assert_eq!(monthly, Decimal::from(24_000));
/// ```
pub fn to_monthly_equivalent(amount: Decimal, frequency: PayFrequency) -> EngineResult<Decimal> {
    if frequency == PayFrequency::Monthly {
        return Ok(amount);
    }
    let annual = mul(
        amount,
        Decimal::from(frequency.periods_per_year()),
        "annualized income",
    )?;
    div(annual, Decimal::from(MONTHS_PER_YEAR), "monthly equivalent income")
}

/// Converts a monthly amount back to the share of one period.
pub fn from_monthly_equivalent(amount: Decimal, frequency: PayFrequency) -> EngineResult<Decimal> {
    if frequency == PayFrequency::Monthly {
        return Ok(amount);
    }
    let annual = mul(amount, Decimal::from(MONTHS_PER_YEAR), "annualized tax")?;
    div(
        annual,
        Decimal::from(frequency.periods_per_year()),
        "period tax",
    )
}

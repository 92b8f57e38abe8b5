//! Progressive income tax (ISR) withholding.
//!
//! This module applies a marginal bracket table to a taxable base:
//! `tax = fixed_fee + (base − lower_bound) × marginal_rate` for the bracket
//! with `lower_bound ≤ base < upper_bound`.

use rust_decimal::Decimal;

use crate::config::TaxBracketTable;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, PayFrequency};

use super::period_normalization::{from_monthly_equivalent, to_monthly_equivalent};
use super::rounding::{add, mul, round_currency};

/// Rule identifier recorded in the audit trail.
pub const INCOME_TAX_RULE_ID: &str = "isr_withholding";

/// Statute the income tax rule implements.
pub const INCOME_TAX_LEGAL_REF: &str = "LISR art. 96";

/// Tax computed against one bracket, before any rounding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketTax {
    /// Zero-based index of the bracket applied.
    pub bracket_index: usize,
    /// Lower bound of the bracket applied.
    pub lower_bound: Decimal,
    /// Fixed fee of the bracket applied.
    pub fixed_fee: Decimal,
    /// Marginal rate of the bracket applied.
    pub marginal_rate: Decimal,
    /// Amount above the bracket's lower bound.
    pub excess: Decimal,
    /// Full-precision tax.
    pub tax: Decimal,
}

/// Applies the bracket table to a base, keeping full precision.
///
/// Returns `InvalidInput` for a negative base. A zero base always yields zero.
pub fn apply_brackets(base: Decimal, table: &TaxBracketTable) -> EngineResult<BracketTax> {
    if base < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "taxable_base",
            format!("must not be negative, got {}", base),
        ));
    }

    let (bracket_index, bracket) = table.find(base).ok_or_else(|| {
        EngineError::invalid_input("taxable_base", format!("no bracket contains {}", base))
    })?;

    let excess = base - bracket.lower_bound;
    let marginal = mul(excess, bracket.marginal_rate, "marginal income tax")?;
    let tax = add(bracket.fixed_fee, marginal, "income tax")?;

    Ok(BracketTax {
        bracket_index,
        lower_bound: bracket.lower_bound,
        fixed_fee: bracket.fixed_fee,
        marginal_rate: bracket.marginal_rate,
        excess,
        tax,
    })
}

/// The result of an income tax calculation for one period.
#[derive(Debug, Clone)]
pub struct IncomeTaxResult {
    /// The taxable base normalized to a monthly amount.
    pub monthly_base: Decimal,
    /// The bracket computation on the monthly base.
    pub bracket: BracketTax,
    /// Tax for the period at full precision.
    pub period_tax: Decimal,
    /// Tax for the period rounded to centavos.
    pub tax: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates income tax withholding for one pay period.
///
/// The period's taxable base is normalized to a monthly amount, taxed with
/// the monthly table, and the tax converted back to the period. Rounding
/// happens once, on the returned `tax`.
///
/// # Arguments
///
/// * `taxable_base` - Taxable income for the period (non-negative)
/// * `frequency` - The period's pay frequency
/// * `table` - The monthly bracket table for the jurisdiction-year
/// * `step_number` - The audit step number to assign
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_income_tax;
/// use payroll_engine::config::{JurisdictionKey, TaxBracket, TaxBracketTable};
/// use payroll_engine::models::PayFrequency;
/// use rust_decimal::Decimal;
///
/// let key = JurisdictionKey::new("XX", 2024).unwrap();
/// let table = TaxBracketTable::new(&key, vec![
///     TaxBracket { lower_bound: Decimal::ZERO, upper_bound: Some(Decimal::from(1000)), fixed_fee: Decimal::ZERO, marginal_rate: Decimal::new(10, 2) },
///     TaxBracket { lower_bound: Decimal::from(1000), upper_bound: None, fixed_fee: Decimal::from(100), marginal_rate: Decimal::new(20, 2) },
/// ]).unwrap();
///
/// let result = calculate_income_tax(Decimal::from(1500), PayFrequency::Monthly, &table, 1).unwrap();
/// assert_eq!(result.tax, Decimal::from(200));
/// ```
pub fn calculate_income_tax(
    taxable_base: Decimal,
    frequency: PayFrequency,
    table: &TaxBracketTable,
    step_number: u32,
) -> EngineResult<IncomeTaxResult> {
    if taxable_base < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "taxable_base",
            format!("must not be negative, got {}", taxable_base),
        ));
    }

    let monthly_base = to_monthly_equivalent(taxable_base, frequency)?;
    let bracket = apply_brackets(monthly_base, table)?;
    let period_tax = from_monthly_equivalent(bracket.tax, frequency)?;
    let tax = round_currency(period_tax);

    let audit_step = AuditStep {
        step_number,
        rule_id: INCOME_TAX_RULE_ID.to_string(),
        rule_name: "ISR Withholding".to_string(),
        legal_ref: INCOME_TAX_LEGAL_REF.to_string(),
        input: serde_json::json!({
            "taxable_base": taxable_base.to_string(),
            "frequency": frequency.as_str(),
            "monthly_base": monthly_base.to_string()
        }),
        output: serde_json::json!({
            "bracket": bracket.bracket_index + 1,
            "lower_bound": bracket.lower_bound.to_string(),
            "fixed_fee": bracket.fixed_fee.to_string(),
            "marginal_rate": bracket.marginal_rate.to_string(),
            "monthly_tax": bracket.tax.to_string(),
            "tax": tax.to_string()
        }),
        reasoning: format!(
            "Monthly base ${} falls in bracket {}: ${} + (${} - ${}) x {} = ${}; {} withholding ${}",
            monthly_base,
            bracket.bracket_index + 1,
            bracket.fixed_fee,
            monthly_base,
            bracket.lower_bound,
            bracket.marginal_rate,
            bracket.tax,
            frequency,
            tax
        ),
    };

    Ok(IncomeTaxResult {
        monthly_base,
        bracket,
        period_tax,
        tax,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::mx_2024_config;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn table() -> TaxBracketTable {
        mx_2024_config().income_tax().clone()
    }

    #[test]
    fn test_zero_base_is_zero_tax() {
        let result = calculate_income_tax(Decimal::ZERO, PayFrequency::Monthly, &table(), 1).unwrap();
        assert_eq!(result.tax, Decimal::ZERO);
        assert_eq!(result.bracket.bracket_index, 0);
    }

    #[test]
    fn test_negative_base_is_invalid_input() {
        let result = calculate_income_tax(dec("-0.01"), PayFrequency::Monthly, &table(), 1);
        match result {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "taxable_base"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_first_bracket() {
        // 500 × 1.92% = 9.60
        let result = calculate_income_tax(dec("500"), PayFrequency::Monthly, &table(), 1).unwrap();
        assert_eq!(result.tax, dec("9.60"));
    }

    #[test]
    fn test_monthly_25000() {
        // 1640.18 + (25000 - 15487.72) × 21.36% = 3672.003008
        let result =
            calculate_income_tax(dec("25000.00"), PayFrequency::Monthly, &table(), 1).unwrap();
        assert_eq!(result.bracket.bracket_index, 5);
        assert_eq!(result.period_tax, dec("3672.003008"));
        assert_eq!(result.tax, dec("3672.00"));
    }

    #[test]
    fn test_boundary_belongs_to_upper_bracket_and_equals_fixed_fee() {
        let table = table();
        for (i, bracket) in table.brackets().iter().enumerate().skip(1) {
            let result = apply_brackets(bracket.lower_bound, &table).unwrap();
            assert_eq!(result.bracket_index, i);
            assert_eq!(result.tax, bracket.fixed_fee);
        }
    }

    #[test]
    fn test_one_centavo_below_boundary_uses_lower_bracket() {
        let result = apply_brackets(dec("15487.71"), &table()).unwrap();
        assert_eq!(result.bracket_index, 4);
    }

    #[test]
    fn test_top_bracket_is_unbounded() {
        // 117912.32 + (400000 - 375975.62) × 35% = 126320.853
        let result =
            calculate_income_tax(dec("400000"), PayFrequency::Monthly, &table(), 1).unwrap();
        assert_eq!(result.bracket.bracket_index, 10);
        assert_eq!(result.tax, dec("126320.85"));
    }

    #[test]
    fn test_weekly_is_normalized_through_monthly_table() {
        // 3000 weekly → 13000 monthly → 1182.88 + 64.17 × 17.92% = 1194.379264
        // → × 12 / 52 = 275.625984
        let result = calculate_income_tax(dec("3000"), PayFrequency::Weekly, &table(), 1).unwrap();
        assert_eq!(result.monthly_base, dec("13000"));
        assert_eq!(result.bracket.tax, dec("1194.379264"));
        assert_eq!(result.period_tax, dec("275.625984"));
        assert_eq!(result.tax, dec("275.63"));
    }

    #[test]
    fn test_semimonthly_half_of_monthly_income_pays_half_the_tax() {
        let monthly =
            calculate_income_tax(dec("25000"), PayFrequency::Monthly, &table(), 1).unwrap();
        let semimonthly =
            calculate_income_tax(dec("12500"), PayFrequency::Semimonthly, &table(), 1).unwrap();
        assert_eq!(semimonthly.period_tax * dec("2"), monthly.period_tax);
    }

    #[test]
    fn test_audit_step_records_bracket() {
        let result =
            calculate_income_tax(dec("25000.00"), PayFrequency::Monthly, &table(), 3).unwrap();
        assert_eq!(result.audit_step.step_number, 3);
        assert_eq!(result.audit_step.rule_id, "isr_withholding");
        assert_eq!(result.audit_step.legal_ref, "LISR art. 96");
        assert_eq!(result.audit_step.output["bracket"], 6);
        assert_eq!(result.audit_step.output["tax"], "3672.00");
        assert!(result.audit_step.reasoning.contains("bracket 6"));
    }
}

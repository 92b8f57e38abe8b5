//! Calculation logic for the Payroll Calculation Engine.
//!
//! This module contains the pure calculation functions: currency rounding,
//! normalization of period amounts onto the monthly tax table, progressive
//! income tax withholding, social-security and housing-fund contributions,
//! and the orchestration that combines them into a payroll result.

mod contributions;
mod income_tax;
mod payroll;
mod period_normalization;
mod rounding;

pub use contributions::{
    CONTRIBUTION_CAP_WARNING, CONTRIBUTION_FLOOR_WARNING, ContributionClamp,
    ContributionsResult, HOUSING_FUND_RULE_ID, SOCIAL_SECURITY_RULE_ID, calculate_contributions,
};
pub use income_tax::{
    BracketTax, INCOME_TAX_LEGAL_REF, INCOME_TAX_RULE_ID, IncomeTaxResult, apply_brackets,
    calculate_income_tax,
};
pub use payroll::{HOUSING_FUND_DEDUCTED_WARNING, calculate_payroll, calculate_payroll_with_config};
pub use period_normalization::{from_monthly_equivalent, to_monthly_equivalent};
pub use rounding::round_currency;
pub(crate) use rounding::add;

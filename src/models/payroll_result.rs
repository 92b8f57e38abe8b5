//! Payroll result models for the Payroll Calculation Engine.
//!
//! This module contains the [`PayrollResult`] type and its associated structures
//! that capture every output of a calculation: deductions, net pay, employer
//! contributions and an audit trail of the rules applied.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::add;
use crate::error::EngineResult;

use super::PayFrequency;

/// Employer-side contributions, reported but never deducted from net pay.
///
/// # Example
///
/// ```
/// use payroll_engine::models::EmployerContributions;
/// use rust_decimal::Decimal;
///
/// let contributions =
///     EmployerContributions::new(Decimal::new(254_839, 2), Decimal::new(125_000, 2)).unwrap();
/// assert_eq!(contributions.total, Decimal::new(379_839, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContributions {
    /// Employer social-security (IMSS) contribution.
    pub social_security: Decimal,
    /// Housing-fund (INFONAVIT) contribution.
    pub housing_fund: Decimal,
    /// Sum of the employer contributions.
    pub total: Decimal,
}

impl EmployerContributions {
    /// Builds the breakdown from already-rounded components.
    ///
    /// Fails with `CalculationError` if the total overflows.
    pub fn new(social_security: Decimal, housing_fund: Decimal) -> EngineResult<Self> {
        Ok(Self {
            social_security,
            housing_fund,
            total: add(social_security, housing_fund, "employer contributions")?,
        })
    }
}

/// A single step in the audit trail recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the statute the rule implements.
    pub legal_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag conditions worth a payroll officer's attention without
/// preventing the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The audit trail for one calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The complete, immutable result of a payroll calculation.
///
/// Every monetary field is rounded to centavos. The amounts reconcile exactly:
/// `net_pay + total_deductions == gross_pay`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    /// The employee the calculation is for, when supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// The jurisdiction-year whose tables were applied.
    pub jurisdiction: String,
    /// The pay frequency of the period.
    pub frequency: PayFrequency,
    /// Base salary plus additional taxable income.
    pub gross_pay: Decimal,
    /// The base income tax was computed on.
    pub taxable_base: Decimal,
    /// Income tax (ISR) withheld for the period.
    pub income_tax_withheld: Decimal,
    /// Employee social-security (IMSS) contribution.
    pub social_security_employee: Decimal,
    /// Housing-fund amount deducted from the employee, zero unless the policy deducts it.
    pub housing_fund_employee: Decimal,
    /// Sum of all employee deductions.
    pub total_deductions: Decimal,
    /// Gross pay minus total deductions.
    pub net_pay: Decimal,
    /// Employer-side contributions for reporting.
    pub employer_contributions: EmployerContributions,
    /// Audit trail of the rules applied.
    pub audit: AuditTrace,
}

impl PayrollResult {
    /// Returns true when the amounts reconcile exactly.
    pub fn is_balanced(&self) -> bool {
        let deductions = self
            .income_tax_withheld
            .checked_add(self.social_security_employee)
            .and_then(|sum| sum.checked_add(self.housing_fund_employee));
        self.net_pay.checked_add(self.total_deductions) == Some(self.gross_pay)
            && deductions == Some(self.total_deductions)
    }
}

//! Compensation input model.
//!
//! This module defines [`EmployeeCompensationInput`], the per-request value
//! describing what an employee earned in one pay period.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::PayFrequency;

/// Jurisdiction applied when a request does not name one.
pub const DEFAULT_JURISDICTION: &str = "MX-2024";

/// Currency amounts are expressed in at most this many decimal places.
pub const CURRENCY_SCALE: u32 = 2;

fn default_jurisdiction() -> String {
    DEFAULT_JURISDICTION.to_string()
}

/// Compensation earned by one employee in one pay period.
///
/// Created per calculation request and never persisted by the engine.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{EmployeeCompensationInput, PayFrequency};
/// use rust_decimal::Decimal;
///
/// let input = EmployeeCompensationInput::new(Decimal::new(2_500_000, 2), PayFrequency::Monthly);
/// assert_eq!(input.jurisdiction, "MX-2024");
/// assert_eq!(input.gross_pay(), Decimal::new(2_500_000, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeCompensationInput {
    /// Optional employee identifier, carried through to the result for reporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// Base salary for the period.
    pub base_salary: Decimal,
    /// The frequency the salary is paid at.
    pub frequency: PayFrequency,
    /// Jurisdiction-year key, e.g. "MX-2024".
    #[serde(default = "default_jurisdiction")]
    pub jurisdiction: String,
    /// Taxable income on top of the base salary (bonuses, commissions).
    #[serde(default)]
    pub additional_taxable_income: Decimal,
}

impl EmployeeCompensationInput {
    /// Creates an input for the default jurisdiction with no additional income.
    pub fn new(base_salary: Decimal, frequency: PayFrequency) -> Self {
        Self {
            employee_id: None,
            base_salary,
            frequency,
            jurisdiction: default_jurisdiction(),
            additional_taxable_income: Decimal::ZERO,
        }
    }

    /// Sets the employee identifier.
    pub fn with_employee_id(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    /// Sets the jurisdiction key.
    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.jurisdiction = jurisdiction.into();
        self
    }

    /// Sets the additional taxable income.
    pub fn with_additional_taxable_income(mut self, amount: Decimal) -> Self {
        self.additional_taxable_income = amount;
        self
    }

    /// Gross pay for the period: base salary plus additional taxable income.
    pub fn gross_pay(&self) -> Decimal {
        self.base_salary + self.additional_taxable_income
    }

    /// Validates the monetary fields.
    ///
    /// Amounts must be non-negative and expressible in centavos.
    pub fn validate(&self) -> EngineResult<()> {
        validate_amount("base_salary", self.base_salary)?;
        validate_amount("additional_taxable_income", self.additional_taxable_income)?;
        Ok(())
    }
}

fn validate_amount(field: &str, amount: Decimal) -> EngineResult<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(EngineError::invalid_input(
            field,
            format!("must not be negative, got {}", amount),
        ));
    }
    if amount.normalize().scale() > CURRENCY_SCALE {
        return Err(EngineError::invalid_input(
            field,
            format!(
                "must have at most {} decimal places, got {}",
                CURRENCY_SCALE, amount
            ),
        ));
    }
    Ok(())
}

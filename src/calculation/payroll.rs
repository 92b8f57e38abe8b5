//! Payroll orchestration.
//!
//! Combines income tax withholding and contributions into a single
//! [`PayrollResult`]. Every component is rounded once, then
//! `total_deductions` is the sum of the rounded deductions and `net_pay` the
//! difference from gross pay, so the result always reconciles.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{JurisdictionConfig, JurisdictionKey, JurisdictionRegistry};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, EmployeeCompensationInput, EmployerContributions,
    PayPeriod, PayrollResult,
};

use super::contributions::calculate_contributions;
use super::income_tax::calculate_income_tax;
use super::rounding::{add, round_currency, sub};

/// Warning code emitted when the housing fund is deducted from the employee.
pub const HOUSING_FUND_DEDUCTED_WARNING: &str = "HOUSING_FUND_EMPLOYEE_DEDUCTED";

/// Calculates payroll for one employee and period, resolving the
/// jurisdiction-year from the registry.
///
/// The jurisdiction is looked up exactly as requested; an unloaded year is
/// reported as `MissingConfiguration` and never replaced by another year.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use payroll_engine::calculation::calculate_payroll;
/// use payroll_engine::config::ConfigLoader;
/// use payroll_engine::models::{EmployeeCompensationInput, PayFrequency, PayPeriod};
/// use rust_decimal::Decimal;
///
/// let registry = ConfigLoader::load("./config").unwrap().into_registry();
/// let input = EmployeeCompensationInput::new(Decimal::new(2_500_000, 2), PayFrequency::Monthly);
/// let period = PayPeriod {
///     start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
///     frequency: PayFrequency::Monthly,
/// };
///
/// let result = calculate_payroll(&input, &period, &registry).unwrap();
/// assert_eq!(result.net_pay, Decimal::new(2_073_425, 2));
/// ```
pub fn calculate_payroll(
    input: &EmployeeCompensationInput,
    period: &PayPeriod,
    registry: &JurisdictionRegistry,
) -> EngineResult<PayrollResult> {
    input.validate()?;
    let config = registry.resolve(&input.jurisdiction)?;
    calculate_payroll_with_config(input, period, config)
}

/// Calculates payroll for one employee and period against a single
/// jurisdiction configuration.
///
/// The input's jurisdiction must name the supplied configuration.
pub fn calculate_payroll_with_config(
    input: &EmployeeCompensationInput,
    period: &PayPeriod,
    config: &JurisdictionConfig,
) -> EngineResult<PayrollResult> {
    input.validate()?;
    period.validate()?;

    if input.frequency != period.frequency {
        return Err(EngineError::invalid_input(
            "frequency",
            format!(
                "compensation frequency {} does not match pay period frequency {}",
                input.frequency, period.frequency
            ),
        ));
    }

    let requested: JurisdictionKey = input.jurisdiction.parse()?;
    if &requested != config.key() {
        return Err(EngineError::missing_configuration(
            &requested,
            format!("configuration supplied is for {}", config.key()),
        ));
    }

    debug!(
        employee_id = input.employee_id.as_deref().unwrap_or("-"),
        jurisdiction = %requested,
        frequency = %input.frequency,
        calendar_days = period.calendar_days(),
        "Calculating payroll"
    );

    let mut steps: Vec<AuditStep> = Vec::new();
    let mut warnings: Vec<AuditWarning> = Vec::new();
    let mut step_number: u32 = 1;

    // Gross pay and taxable base
    let gross_pay = add(
        input.base_salary,
        input.additional_taxable_income,
        "gross pay",
    )?;
    let taxable_base = gross_pay;
    steps.push(AuditStep {
        step_number,
        rule_id: "taxable_base".to_string(),
        rule_name: "Taxable Base".to_string(),
        legal_ref: "LISR art. 94".to_string(),
        input: serde_json::json!({
            "base_salary": input.base_salary.to_string(),
            "additional_taxable_income": input.additional_taxable_income.to_string()
        }),
        output: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "taxable_base": taxable_base.to_string()
        }),
        reasoning: format!(
            "${} base salary + ${} additional taxable income = ${}",
            input.base_salary, input.additional_taxable_income, gross_pay
        ),
    });
    step_number += 1;

    // Income tax
    let income_tax = calculate_income_tax(
        taxable_base,
        input.frequency,
        config.income_tax(),
        step_number,
    )?;
    steps.push(income_tax.audit_step);
    step_number += 1;

    // Contributions
    let contributions = calculate_contributions(input.base_salary, period, config, step_number)?;
    step_number += contributions.audit_steps.len() as u32;
    steps.extend(contributions.audit_steps);
    warnings.extend(contributions.warnings);

    let policy = config.deduction_policy();
    let housing_fund_employee = if policy.housing_fund_employee_deducted {
        warnings.push(AuditWarning {
            code: HOUSING_FUND_DEDUCTED_WARNING.to_string(),
            message: format!(
                "Housing fund of ${} deducted from employee pay by {} policy",
                contributions.housing_fund,
                config.key()
            ),
            severity: "medium".to_string(),
        });
        contributions.housing_fund
    } else {
        Decimal::ZERO
    };

    // Deductions and net pay
    let gross_pay = round_currency(gross_pay);
    let total_deductions = add(
        add(
            income_tax.tax,
            contributions.social_security_employee,
            "total deductions",
        )?,
        housing_fund_employee,
        "total deductions",
    )?;
    let net_pay = sub(gross_pay, total_deductions, "net pay")?;

    steps.push(AuditStep {
        step_number,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        legal_ref: "LFT art. 110".to_string(),
        input: serde_json::json!({
            "gross_pay": gross_pay.to_string(),
            "income_tax_withheld": income_tax.tax.to_string(),
            "social_security_employee": contributions.social_security_employee.to_string(),
            "housing_fund_employee": housing_fund_employee.to_string()
        }),
        output: serde_json::json!({
            "total_deductions": total_deductions.to_string(),
            "net_pay": net_pay.to_string()
        }),
        reasoning: format!(
            "${} gross - ${} deductions = ${}",
            gross_pay, total_deductions, net_pay
        ),
    });

    debug!(
        employee_id = input.employee_id.as_deref().unwrap_or("-"),
        gross_pay = %gross_pay,
        total_deductions = %total_deductions,
        net_pay = %net_pay,
        "Payroll calculated"
    );

    Ok(PayrollResult {
        employee_id: input.employee_id.clone(),
        jurisdiction: requested.to_string(),
        frequency: input.frequency,
        gross_pay,
        taxable_base: round_currency(taxable_base),
        income_tax_withheld: income_tax.tax,
        social_security_employee: contributions.social_security_employee,
        housing_fund_employee,
        total_deductions,
        net_pay,
        employer_contributions: EmployerContributions::new(
            contributions.social_security_employer,
            contributions.housing_fund,
        )?,
        audit: AuditTrace { steps, warnings },
    })
}

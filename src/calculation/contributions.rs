//! Social security (IMSS) and housing fund (INFONAVIT) contributions.
//!
//! Social-security contributions are computed on a daily contribution base
//! clamped to a multiple of the UMA:
//!
//! ```text
//! daily_equivalent  = base_salary / calendar_days
//! contribution_base = min(daily_equivalent, cap_multiple × UMA)
//! contribution      = contribution_base × rate × calendar_days
//! ```
//!
//! The housing fund is a flat percentage of base salary with no cap.

use rust_decimal::Decimal;

use crate::config::{JurisdictionConfig, ResolvedContributionRates};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, PayPeriod};

use super::rounding::{div, mul, round_currency};

/// Rule identifier for the social-security step.
pub const SOCIAL_SECURITY_RULE_ID: &str = "imss_contributions";

/// Rule identifier for the housing fund step.
pub const HOUSING_FUND_RULE_ID: &str = "infonavit_contribution";

/// Warning code emitted when the daily salary exceeds the contribution cap.
pub const CONTRIBUTION_CAP_WARNING: &str = "CONTRIBUTION_CAP_APPLIED";

/// Warning code emitted when the daily salary is raised to the contribution floor.
pub const CONTRIBUTION_FLOOR_WARNING: &str = "CONTRIBUTION_FLOOR_APPLIED";

/// How the daily salary relates to the configured cap and floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionClamp {
    /// The daily salary was used as-is.
    None,
    /// The daily salary was lowered to the cap.
    Capped,
    /// The daily salary was raised to the floor.
    Floored,
}

/// The result of the contribution calculation for one period.
#[derive(Debug, Clone)]
pub struct ContributionsResult {
    /// Calendar days in the period.
    pub calendar_days: i64,
    /// Base salary divided by calendar days, full precision.
    pub daily_equivalent: Decimal,
    /// Daily salary after the cap or floor.
    pub contribution_base_daily: Decimal,
    /// Contribution base for the whole period.
    pub contribution_base_period: Decimal,
    /// Whether the cap or floor changed the base.
    pub clamp: ContributionClamp,
    /// Employee social-security contribution, rounded.
    pub social_security_employee: Decimal,
    /// Employer social-security contribution, rounded.
    pub social_security_employer: Decimal,
    /// Housing-fund contribution, rounded.
    pub housing_fund: Decimal,
    /// Audit steps for social security and housing fund, in that order.
    pub audit_steps: Vec<AuditStep>,
    /// Warnings raised while clamping.
    pub warnings: Vec<AuditWarning>,
}

/// Calculates employee and employer social-security contributions and the
/// housing-fund contribution for one period.
///
/// # Arguments
///
/// * `base_salary` - Base salary for the period (non-negative)
/// * `period` - The pay period; its calendar days drive the daily equivalent
/// * `config` - The jurisdiction whose contribution rates apply
/// * `step_number` - The audit step number of the first step produced
///
/// # Returns
///
/// Returns `MissingConfiguration` if the UMA, any rate or the cap is absent
/// or zero, and `InvalidInput` for a negative salary or an empty period.
pub fn calculate_contributions(
    base_salary: Decimal,
    period: &PayPeriod,
    config: &JurisdictionConfig,
    step_number: u32,
) -> EngineResult<ContributionsResult> {
    let rates = config.contributions().resolve(config.key())?;

    if base_salary < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            "base_salary",
            format!("must not be negative, got {}", base_salary),
        ));
    }

    let calendar_days = period.calendar_days();
    if calendar_days <= 0 {
        return Err(EngineError::invalid_input(
            "pay_period",
            format!("period has {} calendar days", calendar_days),
        ));
    }
    let days = period.calendar_days_decimal();

    let daily_equivalent = div(base_salary, days, "daily salary equivalent")?;
    let (contribution_base_daily, clamp) = clamp_daily_base(daily_equivalent, &rates);

    // Unclamped, the period base is the salary itself; re-multiplying the
    // quotient would reintroduce its truncated digits.
    let contribution_base_period = match clamp {
        ContributionClamp::None => base_salary,
        _ => mul(contribution_base_daily, days, "contribution base")?,
    };

    let social_security_employee = round_currency(mul(
        contribution_base_period,
        rates.employee_social_security_rate,
        "employee social security",
    )?);
    let social_security_employer = round_currency(mul(
        contribution_base_period,
        rates.employer_social_security_rate,
        "employer social security",
    )?);
    let housing_fund = round_currency(mul(
        base_salary,
        rates.housing_fund_rate,
        "housing fund",
    )?);

    let mut warnings = Vec::new();
    match clamp {
        ContributionClamp::Capped => warnings.push(AuditWarning {
            code: CONTRIBUTION_CAP_WARNING.to_string(),
            message: format!(
                "Daily salary ${} exceeds {} UMA; contributions computed on ${}",
                daily_equivalent.round_dp(2),
                rates.contribution_cap_uma_multiple,
                contribution_base_daily
            ),
            severity: "low".to_string(),
        }),
        ContributionClamp::Floored => warnings.push(AuditWarning {
            code: CONTRIBUTION_FLOOR_WARNING.to_string(),
            message: format!(
                "Daily salary ${} is below the contribution floor; contributions computed on ${}",
                daily_equivalent.round_dp(2),
                contribution_base_daily
            ),
            severity: "medium".to_string(),
        }),
        ContributionClamp::None => {}
    }

    let social_security_step = AuditStep {
        step_number,
        rule_id: SOCIAL_SECURITY_RULE_ID.to_string(),
        rule_name: "IMSS Contributions".to_string(),
        legal_ref: "LSS art. 28".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.to_string(),
            "calendar_days": calendar_days,
            "uma_daily_value": rates.uma_daily_value.to_string(),
            "cap_uma_multiple": rates.contribution_cap_uma_multiple.to_string()
        }),
        output: serde_json::json!({
            "daily_equivalent": daily_equivalent.to_string(),
            "contribution_base_daily": contribution_base_daily.to_string(),
            "clamp": clamp_label(clamp),
            "employee": social_security_employee.to_string(),
            "employer": social_security_employer.to_string()
        }),
        reasoning: format!(
            "Contribution base ${} over {} days at employee rate {} and employer rate {}",
            contribution_base_period,
            calendar_days,
            rates.employee_social_security_rate,
            rates.employer_social_security_rate
        ),
    };

    let housing_fund_step = AuditStep {
        step_number: step_number + 1,
        rule_id: HOUSING_FUND_RULE_ID.to_string(),
        rule_name: "INFONAVIT Contribution".to_string(),
        legal_ref: "Ley del INFONAVIT art. 29".to_string(),
        input: serde_json::json!({
            "base_salary": base_salary.to_string(),
            "rate": rates.housing_fund_rate.to_string()
        }),
        output: serde_json::json!({
            "housing_fund": housing_fund.to_string()
        }),
        reasoning: format!(
            "${} x {} = ${}",
            base_salary, rates.housing_fund_rate, housing_fund
        ),
    };

    Ok(ContributionsResult {
        calendar_days,
        daily_equivalent,
        contribution_base_daily,
        contribution_base_period,
        clamp,
        social_security_employee,
        social_security_employer,
        housing_fund,
        audit_steps: vec![social_security_step, housing_fund_step],
        warnings,
    })
}

fn clamp_daily_base(
    daily_equivalent: Decimal,
    rates: &ResolvedContributionRates,
) -> (Decimal, ContributionClamp) {
    let cap = rates.daily_cap();
    if daily_equivalent > cap {
        return (cap, ContributionClamp::Capped);
    }
    match rates.daily_floor() {
        Some(floor) if daily_equivalent > Decimal::ZERO && daily_equivalent < floor => {
            (floor.min(cap), ContributionClamp::Floored)
        }
        _ => (daily_equivalent, ContributionClamp::None),
    }
}

fn clamp_label(clamp: ContributionClamp) -> &'static str {
    match clamp {
        ContributionClamp::None => "none",
        ContributionClamp::Capped => "cap",
        ContributionClamp::Floored => "floor",
    }
}

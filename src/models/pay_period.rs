//! Pay period and pay frequency models.
//!
//! This module contains the [`PayPeriod`] and [`PayFrequency`] types that define
//! the window a payroll calculation covers.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// How often an employee is paid.
///
/// The frequency determines how period income is normalized onto the
/// canonical monthly bracket table.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayFrequency;
///
/// assert_eq!(PayFrequency::Weekly.periods_per_year(), 52);
/// assert_eq!(PayFrequency::Monthly.periods_per_year(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// Paid every seven days.
    Weekly,
    /// Paid every fourteen days.
    Biweekly,
    /// Paid twice per calendar month (quincena).
    Semimonthly,
    /// Paid once per calendar month.
    Monthly,
}

impl PayFrequency {
    /// Number of pay periods of this frequency in one year.
    pub fn periods_per_year(self) -> u32 {
        match self {
            PayFrequency::Weekly => 52,
            PayFrequency::Biweekly => 26,
            PayFrequency::Semimonthly => 24,
            PayFrequency::Monthly => 12,
        }
    }

    /// Inclusive range of calendar days a period of this frequency may span.
    pub fn allowed_days(self) -> (i64, i64) {
        match self {
            PayFrequency::Weekly => (7, 7),
            PayFrequency::Biweekly => (14, 14),
            PayFrequency::Semimonthly => (13, 16),
            PayFrequency::Monthly => (28, 31),
        }
    }

    /// Returns the frequency as its wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            PayFrequency::Weekly => "weekly",
            PayFrequency::Biweekly => "biweekly",
            PayFrequency::Semimonthly => "semimonthly",
            PayFrequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a pay period with its date range and frequency.
///
/// Immutable calculation input. Both dates are inclusive.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayFrequency, PayPeriod};
/// use chrono::NaiveDate;
///
/// let period = PayPeriod {
///     start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
///     frequency: PayFrequency::Monthly,
/// };
///
/// assert_eq!(period.calendar_days(), 31);
/// assert!(period.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
    /// The pay frequency this period belongs to.
    pub frequency: PayFrequency,
}

impl PayPeriod {
    /// Number of calendar days covered by the period, inclusive of both ends.
    pub fn calendar_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Calendar days as a decimal, for contribution arithmetic.
    pub fn calendar_days_decimal(&self) -> Decimal {
        Decimal::from(self.calendar_days())
    }

    /// Checks that the period is well formed for its frequency.
    ///
    /// Returns `InvalidInput` when the end date precedes the start date or the
    /// number of days does not fit the declared frequency.
    pub fn validate(&self) -> EngineResult<()> {
        if self.end_date < self.start_date {
            return Err(EngineError::invalid_input(
                "pay_period",
                format!(
                    "end date {} is before start date {}",
                    self.end_date, self.start_date
                ),
            ));
        }

        let days = self.calendar_days();
        let (min, max) = self.frequency.allowed_days();
        if days < min || days > max {
            return Err(EngineError::invalid_input(
                "pay_period",
                format!(
                    "{} period spans {} days, expected {}",
                    self.frequency,
                    days,
                    if min == max {
                        min.to_string()
                    } else {
                        format!("{}-{}", min, max)
                    }
                ),
            ));
        }

        Ok(())
    }
}

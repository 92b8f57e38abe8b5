//! Request types for the Payroll Calculation Engine API.
//!
//! This module defines the JSON request structures for the `/calculate` and
//! `/calculate/batch` endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::batch::BatchItem;
use crate::models::{EmployeeCompensationInput, PayFrequency, PayPeriod};

/// Request body for the `/calculate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The employee's compensation for the period.
    pub compensation: EmployeeCompensationInput,
    /// The pay period being calculated.
    pub pay_period: PayPeriodRequest,
}

/// Pay period information in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayPeriodRequest {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
    /// The period's frequency. Defaults to the compensation frequency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<PayFrequency>,
}

impl PayPeriodRequest {
    fn into_pay_period(self, default_frequency: PayFrequency) -> PayPeriod {
        PayPeriod {
            start_date: self.start_date,
            end_date: self.end_date,
            frequency: self.frequency.unwrap_or(default_frequency),
        }
    }
}

impl From<CalculationRequest> for BatchItem {
    fn from(req: CalculationRequest) -> Self {
        let pay_period = req.pay_period.into_pay_period(req.compensation.frequency);
        BatchItem {
            compensation: req.compensation,
            pay_period,
        }
    }
}

/// Request body for the `/calculate/batch` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCalculationRequest {
    /// The employees to calculate.
    pub items: Vec<CalculationRequest>,
    /// Stop after the first failure.
    #[serde(default)]
    pub fail_fast: bool,
}

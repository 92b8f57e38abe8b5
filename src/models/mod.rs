//! Core data models for the Payroll Calculation Engine.
//!
//! This module contains the input and output value objects of a calculation.

mod compensation;
mod pay_period;
mod payroll_result;

pub use compensation::{CURRENCY_SCALE, DEFAULT_JURISDICTION, EmployeeCompensationInput};
pub use pay_period::{PayFrequency, PayPeriod};
pub use payroll_result::{
    AuditStep, AuditTrace, AuditWarning, EmployerContributions, PayrollResult,
};

//! Payroll Calculation Engine for Mexican statutory withholding
//!
//! This crate computes income tax (ISR) withholding, social-security (IMSS)
//! and housing-fund (INFONAVIT) contributions, net pay, and employer-side
//! contributions for a pay period, from jurisdiction-year tables loaded at
//! startup. The calculation core is pure and synchronous; the batch runner
//! and HTTP adapter are thin layers over it.

#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;

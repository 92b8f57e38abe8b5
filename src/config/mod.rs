//! Configuration loading and management for the Payroll Calculation Engine.
//!
//! This module loads jurisdiction-year bundles (income tax brackets,
//! contribution rates, deduction policy) from YAML files, validates them, and
//! exposes them as an immutable [`JurisdictionRegistry`] that is passed
//! explicitly into every calculation.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let registry = ConfigLoader::load("./config").unwrap().into_registry();
//! for key in registry.keys() {
//!     println!("Loaded jurisdiction: {}", key);
//! }
//! ```

#[cfg(test)]
pub(crate) mod fixtures;
mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BracketTableFile, ContributionRates, DeductionPolicy, JurisdictionConfig, JurisdictionFile,
    JurisdictionKey, JurisdictionMetadata, JurisdictionRegistry, ResolvedContributionRates,
    TaxBracket, TaxBracketTable,
};

//! Error types for the Payroll Calculation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure a payroll calculation or configuration load can report.

use thiserror::Error;

/// The main error type for the Payroll Calculation Engine.
///
/// A calculation either fully succeeds or fails with one of these variants;
/// the engine never returns a partially computed result.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::MissingConfiguration {
///     jurisdiction: "MX-2023".to_string(),
///     item: "jurisdiction".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Missing configuration for MX-2023: jurisdiction"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The compensation input or pay period violated the input contract.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The requested jurisdiction-year, or a value inside it, is not configured.
    #[error("Missing configuration for {jurisdiction}: {item}")]
    MissingConfiguration {
        /// The jurisdiction key (e.g. "MX-2024").
        jurisdiction: String,
        /// The missing item (e.g. "uma_daily_value").
        item: String,
    },

    /// A bracket table failed its structural invariants when loaded.
    #[error("Bracket table for {jurisdiction} is invalid: {message}")]
    BracketTableIntegrity {
        /// The jurisdiction key the table belongs to.
        jurisdiction: String,
        /// A description of the broken invariant.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

impl EngineError {
    pub(crate) fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn missing_configuration(
        jurisdiction: impl ToString,
        item: impl Into<String>,
    ) -> Self {
        EngineError::MissingConfiguration {
            jurisdiction: jurisdiction.to_string(),
            item: item.into(),
        }
    }

    pub(crate) fn overflow(operation: &str) -> Self {
        EngineError::CalculationError {
            message: format!("decimal overflow while computing {}", operation),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

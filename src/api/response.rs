//! Response types for the Payroll Calculation Engine API.
//!
//! This module defines the success and error response bodies for the HTTP
//! API and the mapping from engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::batch::{BatchItemOutcome, BatchItemReport, BatchSummary};
use crate::config::JurisdictionConfig;
use crate::error::EngineError;
use crate::models::PayrollResult;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::InvalidInput { field, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_INPUT",
                    message,
                    format!("The field '{}' was rejected", field),
                ),
            },
            EngineError::MissingConfiguration { jurisdiction, .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "MISSING_CONFIGURATION",
                    message,
                    format!("No usable configuration is loaded for '{}'", jurisdiction),
                ),
            },
            EngineError::BracketTableIntegrity { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new("BRACKET_TABLE_INTEGRITY", message),
            },
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}

/// Response body for a successful `/calculate` request.
///
/// The identifier and timestamp belong to the HTTP exchange; the embedded
/// result is identical for identical inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResponse {
    /// Identifier assigned to this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was served.
    pub calculated_at: DateTime<Utc>,
    /// The payroll result.
    pub result: PayrollResult,
}

/// Status of one item in a batch response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchItemStatus {
    /// The calculation completed.
    Succeeded,
    /// The calculation failed.
    Failed,
    /// The item was not calculated.
    Skipped,
}

/// One item in a batch response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemResponse {
    /// Position of the item in the request.
    pub index: usize,
    /// The employee id from the request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// What happened to the item.
    pub status: BatchItemStatus,
    /// The result, for succeeded items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<PayrollResult>,
    /// The error, for failed items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl From<BatchItemReport> for BatchItemResponse {
    fn from(report: BatchItemReport) -> Self {
        let (status, result, error) = match report.outcome {
            BatchItemOutcome::Succeeded(result) => (BatchItemStatus::Succeeded, Some(result), None),
            BatchItemOutcome::Failed(err) => {
                let api_error: ApiErrorResponse = err.into();
                (BatchItemStatus::Failed, None, Some(api_error.error))
            }
            BatchItemOutcome::Skipped => (BatchItemStatus::Skipped, None, None),
        };
        Self {
            index: report.index,
            employee_id: report.employee_id,
            status,
            result,
            error,
        }
    }
}

/// Response body for `/calculate/batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    /// Identifier assigned to this batch.
    pub batch_id: Uuid,
    /// When the batch was served.
    pub calculated_at: DateTime<Utc>,
    /// Counts and totals.
    pub summary: BatchSummary,
    /// Per-item outcomes in request order.
    pub items: Vec<BatchItemResponse>,
}

/// A loaded jurisdiction, as listed by `/jurisdictions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionSummary {
    /// The jurisdiction key (e.g. "MX-2024").
    pub key: String,
    /// Display name.
    pub name: String,
    /// ISO currency code.
    pub currency: String,
    /// Where the published tables come from.
    pub source_url: String,
    /// Number of income tax brackets.
    pub bracket_count: usize,
    /// Whether the housing fund is deducted from employees.
    pub housing_fund_employee_deducted: bool,
}

impl From<&JurisdictionConfig> for JurisdictionSummary {
    fn from(config: &JurisdictionConfig) -> Self {
        let metadata = config.metadata();
        Self {
            key: config.key().to_string(),
            name: metadata.name.clone(),
            currency: metadata.currency.clone(),
            source_url: metadata.source_url.clone(),
            bracket_count: config.income_tax().brackets().len(),
            housing_fund_employee_deducted: config.deduction_policy().housing_fund_employee_deducted,
        }
    }
}

/// Response body for `/jurisdictions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionsResponse {
    /// Loaded jurisdictions in key order.
    pub jurisdictions: Vec<JurisdictionSummary>,
}

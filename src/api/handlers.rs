//! HTTP request handlers for the Payroll Calculation Engine API.
//!
//! This module contains the handler functions for all API endpoints. Every
//! handler delegates to the pure calculation core; identifiers and timestamps
//! are assigned here, never by the engine.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::batch::{BatchItem, BatchOptions, BatchRunner, CancellationToken};
use crate::calculation::calculate_payroll;

use super::request::{BatchCalculationRequest, CalculationRequest};
use super::response::{
    ApiError, ApiErrorResponse, BatchItemResponse, BatchResponse, CalculationResponse,
    JurisdictionSummary, JurisdictionsResponse,
};
use super::state::AppState;

/// Largest number of items accepted by `/calculate/batch`.
pub const MAX_BATCH_ITEMS: usize = 10_000;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/calculate", post(calculate_handler))
        .route("/calculate/batch", post(calculate_batch_handler))
        .route("/jurisdictions", get(jurisdictions_handler))
        .with_state(state)
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /calculate endpoint.
///
/// Calculates payroll for one employee and period.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let item: BatchItem = request.into();
    let start_time = Instant::now();
    match calculate_payroll(&item.compensation, &item.pay_period, state.registry()) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = item.compensation.employee_id.as_deref().unwrap_or("-"),
                jurisdiction = %result.jurisdiction,
                net_pay = %result.net_pay,
                duration_us = start_time.elapsed().as_micros() as u64,
                "Calculation completed successfully"
            );
            json_response(
                StatusCode::OK,
                CalculationResponse {
                    calculation_id: correlation_id,
                    calculated_at: Utc::now(),
                    result,
                },
            )
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Calculation failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for POST /calculate/batch endpoint.
///
/// Runs the batch on a blocking worker so the async runtime is not held up.
async fn calculate_batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<BatchCalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing batch request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if request.items.len() > MAX_BATCH_ITEMS {
        warn!(
            correlation_id = %correlation_id,
            items = request.items.len(),
            "Batch too large"
        );
        return json_response(
            StatusCode::BAD_REQUEST,
            ApiError::validation_error(format!(
                "batch has {} items, at most {} are accepted",
                request.items.len(),
                MAX_BATCH_ITEMS
            )),
        );
    }

    let runner = BatchRunner::new(
        state.shared_registry(),
        BatchOptions {
            workers: state.batch_workers(),
            fail_fast: request.fail_fast,
        },
    );
    let items: Vec<BatchItem> = request.items.into_iter().map(Into::into).collect();

    let start_time = Instant::now();
    let joined = tokio::task::spawn_blocking(move || {
        runner.run(&items, &CancellationToken::new())
    })
    .await;

    match joined {
        Ok(Ok(report)) => {
            info!(
                correlation_id = %correlation_id,
                succeeded = report.summary.succeeded,
                failed = report.summary.failed,
                skipped = report.summary.skipped,
                duration_us = start_time.elapsed().as_micros() as u64,
                "Batch completed"
            );
            json_response(
                StatusCode::OK,
                BatchResponse {
                    batch_id: correlation_id,
                    calculated_at: Utc::now(),
                    summary: report.summary,
                    items: report.items.into_iter().map(BatchItemResponse::from).collect(),
                },
            )
        }
        Ok(Err(err)) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Batch summary failed"
            );
            error_response(err.into())
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Batch worker failed"
            );
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CALCULATION_ERROR", "Batch failed", err.to_string()),
            )
        }
    }
}

/// Handler for GET /jurisdictions endpoint.
async fn jurisdictions_handler(State(state): State<AppState>) -> Response {
    let jurisdictions: Vec<JurisdictionSummary> =
        state.registry().iter().map(JurisdictionSummary::from).collect();
    json_response(StatusCode::OK, JurisdictionsResponse { jurisdictions })
}

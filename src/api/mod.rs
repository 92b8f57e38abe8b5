//! HTTP API module for the Payroll Calculation Engine.
//!
//! This module provides a thin axum adapter over the calculation core:
//! single calculations, batch runs and a listing of loaded jurisdictions.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{MAX_BATCH_ITEMS, create_router};
pub use request::{BatchCalculationRequest, CalculationRequest, PayPeriodRequest};
pub use response::{
    ApiError, ApiErrorResponse, BatchItemResponse, BatchItemStatus, BatchResponse,
    CalculationResponse, JurisdictionSummary, JurisdictionsResponse,
};
pub use state::AppState;

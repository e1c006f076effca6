//! # REST API Interface Layer
//!
//! JSON endpoints for the student portal and the admin dashboard.
//!
//! - `GET  /api/students/:id/challans[?view=pending|paid]`
//! - `GET  /api/challans[?status=..]`
//! - `POST /api/challans/:id/payments`
//! - `POST /api/challans/:id/cancel`
//! - `POST /api/challans/overdue`
//! - `GET  /api/collections[?year=&month=]`
//! - `GET  /api/siblings`
//!
//! Domain errors become status codes here: not found is 404, duplicates and
//! settled challans are 409, amount and catalog problems are 422, storage
//! failures are 500.

pub mod challan_apis;
pub mod collection_apis;
pub mod mappers;
pub mod student_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};
use shared::ErrorResponse;

use crate::backend::domain::errors::LedgerError;

pub fn status_for(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::DuplicateChallan { .. } | LedgerError::AlreadySettled { .. } => StatusCode::CONFLICT,
        LedgerError::AmountMismatch { .. }
        | LedgerError::InvalidFeeStructure { .. }
        | LedgerError::InvalidDiscount { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Translate a domain error into a JSON error response
pub fn error_response(err: LedgerError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Request failed: {:#}", err);
    } else {
        warn!("Request rejected ({}): {}", status, err);
    }
    let body = ErrorResponse {
        code: err.code().to_string(),
        message: err.to_string(),
    };
    (status, Json(body)).into_response()
}

pub fn bad_request(message: impl Into<String>) -> Response {
    let message = message.into();
    warn!("Bad request: {}", message);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            code: "bad_request".to_string(),
            message,
        }),
    )
        .into_response()
}

//! # REST API for Challan Administration
//!
//! Listing, payments, cancellation and overdue sweeps.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use log::info;
use serde::Deserialize;
use shared::{MarkOverdueRequest, MarkOverdueResponse, RecordPaymentRequest};

use super::mappers::ChallanMapper;
use super::{bad_request, error_response};
use crate::backend::domain::commands::challans::RecordPaymentCommand;
use crate::backend::domain::models::{money::to_decimal, ChallanStatus, PaymentMethod};
use crate::backend::storage::Connection;
use crate::backend::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChallanListQuery {
    pub status: Option<String>,
}

/// Create a router for challan administration APIs
pub fn router<C: Connection + 'static>() -> Router<AppState<C>> {
    Router::new()
        .route("/", get(list_challans::<C>))
        .route("/overdue", post(mark_overdue::<C>))
        .route("/:id/payments", post(record_payment::<C>))
        .route("/:id/cancel", post(cancel_challan::<C>))
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, Response> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| bad_request(format!("Invalid {} '{}', expected YYYY-MM-DD", field, value)))
}

/// List challans, optionally filtered by admin status
pub async fn list_challans<C: Connection + 'static>(
    State(state): State<AppState<C>>,
    Query(query): Query<ChallanListQuery>,
) -> Response {
    info!("GET /api/challans - status: {:?}", query.status);

    let status = match query.status.as_deref().map(str::parse::<ChallanStatus>).transpose() {
        Ok(status) => status,
        Err(e) => return bad_request(e),
    };

    let result = match status {
        None => state.challan_service.list_challans(),
        Some(ChallanStatus::Pending) => state.challan_service.list_pending(),
        Some(ChallanStatus::Overdue) => state.challan_service.list_overdue(),
        Some(ChallanStatus::Paid) => state.challan_service.list_paid(),
        Some(ChallanStatus::Cancelled) => state.challan_service.list_cancelled(),
    };

    match result {
        Ok(challans) => (StatusCode::OK, Json(ChallanMapper::to_list_response(&challans))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Record full settlement of a challan
pub async fn record_payment<C: Connection + 'static>(
    State(state): State<AppState<C>>,
    Path(challan_id): Path<String>,
    Json(request): Json<RecordPaymentRequest>,
) -> Response {
    info!("POST /api/challans/{}/payments - request: {:?}", challan_id, request);

    let method = match request.method.parse::<PaymentMethod>() {
        Ok(method) => method,
        Err(e) => return bad_request(e),
    };
    let date = match parse_date(&request.date, "date") {
        Ok(date) => date,
        Err(response) => return response,
    };

    let command = RecordPaymentCommand {
        challan_id,
        amount: to_decimal(request.amount),
        method,
        date,
    };

    match state.challan_service.record_payment(command) {
        Ok(result) => {
            info!("{}", result.success_message);
            (StatusCode::OK, Json(ChallanMapper::to_row(&result.challan))).into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn cancel_challan<C: Connection + 'static>(
    State(state): State<AppState<C>>,
    Path(challan_id): Path<String>,
) -> Response {
    info!("POST /api/challans/{}/cancel", challan_id);

    match state.challan_service.cancel(&challan_id) {
        Ok(challan) => (StatusCode::OK, Json(ChallanMapper::to_row(&challan))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Move pending challans due before `as_of` to overdue
pub async fn mark_overdue<C: Connection + 'static>(
    State(state): State<AppState<C>>,
    Json(request): Json<MarkOverdueRequest>,
) -> Response {
    info!("POST /api/challans/overdue - as_of: {}", request.as_of);

    let as_of = match parse_date(&request.as_of, "as_of") {
        Ok(date) => date,
        Err(response) => return response,
    };

    match state.challan_service.mark_overdue(as_of) {
        Ok(result) => {
            let response = MarkOverdueResponse {
                success_message: format!("{} challans marked overdue", result.transitioned_ids.len()),
                transitioned_ids: result.transitioned_ids,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e),
    }
}

//! # REST API for Collection Reports
//!
//! Class and school collection totals plus the sibling groups behind the
//! sibling discount.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::info;
use serde::Deserialize;

use super::mappers::{CollectionMapper, SiblingMapper};
use super::{bad_request, error_response};
use crate::backend::domain::commands::collections::CollectionQuery;
use crate::backend::domain::models::BillingPeriod;
use crate::backend::storage::Connection;
use crate::backend::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CollectionParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub fn router<C: Connection + 'static>() -> Router<AppState<C>> {
    Router::new()
        .route("/collections", get(get_collections::<C>))
        .route("/siblings", get(get_sibling_groups::<C>))
}

/// Collection overview, for one billing month when both `year` and `month` are given
pub async fn get_collections<C: Connection + 'static>(
    State(state): State<AppState<C>>,
    Query(params): Query<CollectionParams>,
) -> Response {
    info!("GET /api/collections - params: {:?}", params);

    let period = match (params.year, params.month) {
        (None, None) => None,
        (Some(year), Some(month)) => match BillingPeriod::new(year, month) {
            Some(period) => Some(period),
            None => return bad_request(format!("Invalid billing month {}-{}", year, month)),
        },
        _ => return bad_request("Provide both year and month, or neither"),
    };

    match state.collection_service.overview(CollectionQuery { period }) {
        Ok(overview) => (StatusCode::OK, Json(CollectionMapper::to_overview_response(&overview))).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn get_sibling_groups<C: Connection + 'static>(State(state): State<AppState<C>>) -> Response {
    info!("GET /api/siblings");

    match state.sibling_service.detect() {
        Ok(groups) => (StatusCode::OK, Json(SiblingMapper::to_response(&groups))).into_response(),
        Err(e) => error_response(e),
    }
}

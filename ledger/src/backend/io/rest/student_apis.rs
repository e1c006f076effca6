//! # REST API for the Student Portal
//!
//! Read-only. Everything here comes from the published challan set, never
//! from the admin ledger directly.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use log::info;
use serde::Deserialize;

use super::bad_request;
use super::mappers::ChallanMapper;
use crate::backend::domain::publish_service::PublishedStatus;
use crate::backend::storage::Connection;
use crate::backend::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StudentChallanQuery {
    /// `pending` (pending and overdue), `paid` or `all`
    pub view: Option<String>,
}

pub fn router<C: Connection + 'static>() -> Router<AppState<C>> {
    Router::new().route("/:id/challans", get(list_student_challans::<C>))
}

pub async fn list_student_challans<C: Connection + 'static>(
    State(state): State<AppState<C>>,
    Path(student_id): Path<String>,
    Query(query): Query<StudentChallanQuery>,
) -> Response {
    info!("GET /api/students/{}/challans - view: {:?}", student_id, query.view);

    let view = query.view.as_deref().map(|v| v.trim().to_lowercase());
    let statuses: &[PublishedStatus] = match view.as_deref() {
        None | Some("all") => &[PublishedStatus::Pending, PublishedStatus::Overdue, PublishedStatus::Paid],
        Some("pending") => &[PublishedStatus::Pending, PublishedStatus::Overdue],
        Some("paid") => &[PublishedStatus::Paid],
        Some(other) => return bad_request(format!("Unknown challan view: {}", other)),
    };

    let published: Vec<_> = state
        .publish_service
        .list_for_student(&student_id)
        .into_iter()
        .filter(|c| statuses.contains(&c.status))
        .collect();

    let response = ChallanMapper::to_student_list_response(&student_id, published);
    (StatusCode::OK, Json(response)).into_response()
}

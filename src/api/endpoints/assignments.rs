//! Assignment endpoints.
//!
//! - `POST /api/assignments`: start an assignment (201)
//! - `POST /api/assignments/unassign`: close the open one (200)
//! - `GET /api/assignments/history?doctor_id=&patient_id=`
//! - `GET /api/assignments/:id`

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AssignmentRequest, PairQuery};
use crate::assignment;
use crate::models::Assignment;

pub async fn assign(
    State(ctx): State<ApiContext>,
    body: Result<Json<AssignmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Assignment>), ApiError> {
    let Json(req) = body?;
    let conn = ctx.core.lock_db()?;
    let created = assignment::assign(&conn, &req.doctor_id, &req.patient_id)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn unassign(
    State(ctx): State<ApiContext>,
    body: Result<Json<AssignmentRequest>, JsonRejection>,
) -> Result<Json<Assignment>, ApiError> {
    let Json(req) = body?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(assignment::unassign(&conn, &req.doctor_id, &req.patient_id)?))
}

pub async fn history(
    State(ctx): State<ApiContext>,
    query: Result<Query<PairQuery>, QueryRejection>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    let Query(query) = query?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(assignment::assignment_history(
        &conn,
        &query.doctor_id,
        &query.patient_id,
    )?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Assignment>, ApiError> {
    let Path(id) = path?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(assignment::get_assignment(&conn, &id)?))
}

//! Doctor endpoints.
//!
//! - `POST /api/doctors`: register
//! - `GET /api/doctors?name=`: name prefix search
//! - `GET|PATCH|DELETE /api/doctors/:id`
//! - `GET /api/doctors/:id/patients`: doctor with active patients

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::aggregation;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Deleted, NameQuery};
use crate::models::{Doctor, DoctorPatch, DoctorWithPatients, NewDoctor};
use crate::registry;

pub async fn register(
    State(ctx): State<ApiContext>,
    body: Result<Json<NewDoctor>, JsonRejection>,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    let Json(input) = body?;
    let conn = ctx.core.lock_db()?;
    let doctor = registry::register_doctor(&conn, &input)?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

pub async fn search(
    State(ctx): State<ApiContext>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<Json<Vec<Doctor>>, ApiError> {
    let Query(query) = query?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(registry::search_doctors(&conn, &query.name)?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Doctor>, ApiError> {
    let Path(id) = path?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(registry::get_doctor(&conn, &id)?))
}

pub async fn patch(
    State(ctx): State<ApiContext>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<DoctorPatch>, JsonRejection>,
) -> Result<Json<Doctor>, ApiError> {
    let Path(id) = path?;
    let Json(patch) = body?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(registry::patch_doctor(&conn, &id, &patch)?))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Deleted>, ApiError> {
    let Path(id) = path?;
    let conn = ctx.core.lock_db()?;
    registry::delete_doctor(&conn, &id)?;
    Ok(Json(Deleted { deleted: true, id }))
}

pub async fn patients(
    State(ctx): State<ApiContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<DoctorWithPatients>, ApiError> {
    let Path(id) = path?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(aggregation::doctor_with_active_patients(&conn, &id)?))
}

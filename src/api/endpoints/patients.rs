//! Patient endpoints. Same shape as the doctor ones, minus department.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::aggregation;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Deleted, NameQuery};
use crate::models::{NewPatient, Patient, PatientPatch, PatientWithDoctors};
use crate::registry;

pub async fn register(
    State(ctx): State<ApiContext>,
    body: Result<Json<NewPatient>, JsonRejection>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let Json(input) = body?;
    let conn = ctx.core.lock_db()?;
    let patient = registry::register_patient(&conn, &input)?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn search(
    State(ctx): State<ApiContext>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let Query(query) = query?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(registry::search_patients(&conn, &query.name)?))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Path(id) = path?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(registry::get_patient(&conn, &id)?))
}

pub async fn patch(
    State(ctx): State<ApiContext>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<PatientPatch>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Path(id) = path?;
    let Json(patch) = body?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(registry::patch_patient(&conn, &id, &patch)?))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Deleted>, ApiError> {
    let Path(id) = path?;
    let conn = ctx.core.lock_db()?;
    registry::delete_patient(&conn, &id)?;
    Ok(Json(Deleted { deleted: true, id }))
}

/// `GET /api/patients/:id/doctors`: patient with the doctors treating them.
pub async fn doctors(
    State(ctx): State<ApiContext>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<PatientWithDoctors>, ApiError> {
    let Path(id) = path?;
    let conn = ctx.core.lock_db()?;
    Ok(Json(aggregation::patient_with_active_doctors(&conn, &id)?))
}

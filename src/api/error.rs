//! API error types with structured JSON responses.
//!
//! Every domain failure leaves the server as
//! `{"error": {"code": "...", "message": "..."}}`. The code is the stable
//! `CareError::code`; the message wording is chosen here.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::error::CareError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("Not found: {message}")]
    NotFound { code: &'static str, message: String },
    #[error("Conflict: {message}")]
    Conflict { code: &'static str, message: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            ApiError::NotFound { code, message } => (StatusCode::NOT_FOUND, code, message),
            ApiError::Conflict { code, message } => (StatusCode::CONFLICT, code, message),
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl From<CareError> for ApiError {
    fn from(err: CareError) -> Self {
        let code = err.code();
        match err {
            CareError::InvalidIdentifierFormat { subject, value } => ApiError::BadRequest {
                code,
                message: format!("{value:?} is not a valid {subject} id"),
            },
            CareError::Validation { field, kind } => ApiError::BadRequest {
                code,
                message: format!("{} {kind}", capitalize(&field.to_string())),
            },
            CareError::DoctorNotFound(id) => ApiError::NotFound {
                code,
                message: format!("No doctor with id {id}"),
            },
            CareError::PatientNotFound(id) => ApiError::NotFound {
                code,
                message: format!("No patient with id {id}"),
            },
            CareError::NoAssignmentExists => ApiError::NotFound {
                code,
                message: "No assignment exists".into(),
            },
            CareError::DoctorAlreadyAssigned { .. } => ApiError::Conflict {
                code,
                message: "Doctor is already assigned to this patient".into(),
            },
            CareError::DoctorAlreadyUnassigned { .. } => ApiError::Conflict {
                code,
                message: "Doctor is already unassigned from this patient".into(),
            },
            CareError::AssignedToPatient(_) => ApiError::Conflict {
                code,
                message: "Doctor is still assigned to a patient".into(),
            },
            CareError::AssignedToDoctor(_) => ApiError::Conflict {
                code,
                message: "Patient is still assigned to a doctor".into(),
            },
            CareError::NationalIdTaken => ApiError::Conflict {
                code,
                message: "National ID is already registered".into(),
            },
            CareError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LockPoisoned => ApiError::Internal("lock poisoned".into()),
            CoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            code: "MALFORMED_BODY",
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest {
            code: "MALFORMED_QUERY",
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest {
            code: "MALFORMED_PATH",
            message: rejection.body_text(),
        }
    }
}

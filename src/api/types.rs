//! Shared types for the HTTP API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// `?name=` on the doctor and patient collections.
#[derive(Debug, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /api/assignments` and `POST /api/assignments/unassign`.
///
/// Ids stay strings so malformed values surface as `INVALID_IDENTIFIER`
/// rather than a body parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub doctor_id: String,
    pub patient_id: String,
}

/// `?doctor_id=&patient_id=` on the history endpoint.
#[derive(Debug, Deserialize)]
pub struct PairQuery {
    #[serde(default)]
    pub doctor_id: String,
    #[serde(default)]
    pub patient_id: String,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
    pub id: String,
}

//! HTTP API.
//!
//! Exposes the registry, the assignment engine and the aggregation reader
//! as JSON endpoints under `/api/`. `care_roster_router()` returns a
//! `Router` that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::care_roster_router;
pub use server::{start_api_server, ApiServer};
pub use types::ApiContext;

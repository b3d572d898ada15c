//! API endpoint handlers.
//!
//! Handlers lock the shared connection, call one registry, engine or
//! aggregation operation, and map the result to JSON.

pub mod assignments;
pub mod doctors;
pub mod health;
pub mod patients;

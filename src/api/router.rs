//! HTTP API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//! Layers (outermost first): CORS, then `Cache-Control: no-store` on every response.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the care roster API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn care_roster_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/doctors",
            get(endpoints::doctors::search).post(endpoints::doctors::register),
        )
        .route(
            "/doctors/:id",
            get(endpoints::doctors::detail)
                .patch(endpoints::doctors::patch)
                .delete(endpoints::doctors::remove),
        )
        .route("/doctors/:id/patients", get(endpoints::doctors::patients))
        .route(
            "/patients",
            get(endpoints::patients::search).post(endpoints::patients::register),
        )
        .route(
            "/patients/:id",
            get(endpoints::patients::detail)
                .patch(endpoints::patients::patch)
                .delete(endpoints::patients::remove),
        )
        .route("/patients/:id/doctors", get(endpoints::patients::doctors))
        .route("/assignments", post(endpoints::assignments::assign))
        .route("/assignments/unassign", post(endpoints::assignments::unassign))
        .route("/assignments/history", get(endpoints::assignments::history))
        .route("/assignments/:id", get(endpoints::assignments::detail))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors)
}

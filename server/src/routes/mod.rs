//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the table endpoints the page and CLI consume. Paths
//! keep the names the page has always used (`/addTable`, `/draw/{name}`,
//! ...) rather than an `/api` prefix, so existing clients keep working.

pub mod tables;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Table API routes with CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/load", post(tables::load_tables))
        .route("/addTable", post(tables::add_table))
        .route("/tables", get(tables::list_tables))
        .route("/draw/{name}", get(tables::draw))
        .route("/formatted_draw/{name}", get(tables::formatted_draw))
        .route("/table_entries/{name}", get(tables::table_entries))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

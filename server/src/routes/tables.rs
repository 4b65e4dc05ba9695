//! Table routes: list, draw, inspect, add and reload tables.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is answered with `{ "error": "..." }` and a status from
//! [`store_error_to_status`]. Unknown tables keep the historical
//! `Table not found` message the page matches on.

use std::path::PathBuf;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tables::{Draw, Entry, FormatError, StoreError, TableFile};
use tracing::{error, info, warn};

use crate::state::AppState;

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct LoadResponse {
    pub message: String,
    pub loaded: usize,
    pub skipped: usize,
}

#[derive(Serialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

#[derive(Serialize)]
pub struct DrawResponse {
    pub result: Draw,
}

#[derive(Serialize)]
pub struct FormattedDrawResponse {
    pub result: String,
}

#[derive(Serialize)]
pub struct EntriesResponse {
    pub entries: Vec<Entry>,
}

#[derive(Deserialize, Default)]
pub struct LoadBody {
    pub directory: Option<String>,
}

#[derive(Deserialize)]
pub struct AddTableBody {
    pub table: Option<Value>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Route-level error rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        let status = store_error_to_status(&err);
        let message = match &err {
            StoreError::NotFound(_) => "Table not found".to_owned(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            error!(error = %err, "table store failure");
        }
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

pub(crate) fn store_error_to_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Io(_) | StoreError::Format(FormatError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        StoreError::InvalidName(_) | StoreError::Table(_) | StoreError::Format(_) => StatusCode::BAD_REQUEST,
    }
}

/// Decode the `table` field of an `/addTable` body.
///
/// The page historically sent either a parsed object or the raw JSON text,
/// so both are accepted.
fn parse_table_payload(table: Value) -> Result<TableFile, ApiError> {
    let parsed = match table {
        Value::String(text) => serde_json::from_str::<TableFile>(&text),
        other => serde_json::from_value::<TableFile>(other),
    };
    parsed.map_err(|e| ApiError::bad_request(format!("invalid table definition: {e}")))
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /load`: load tables from `directory` (default: the store dir).
pub async fn load_tables(State(state): State<AppState>, body: Bytes) -> Result<Json<LoadResponse>, ApiError> {
    let body: LoadBody = if body.iter().all(u8::is_ascii_whitespace) {
        LoadBody::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(format!("invalid body: {e}")))?
    };
    let dir = body.directory.map_or_else(|| state.default_dir.clone(), PathBuf::from);

    let report = state.store.write().await.load(&dir);
    info!(dir = %dir.display(), loaded = report.loaded, skipped = report.skipped, "tables reloaded");

    Ok(Json(LoadResponse {
        message: "Tables loaded successfully".to_owned(),
        loaded: report.loaded,
        skipped: report.skipped,
    }))
}

/// `POST /addTable`: add (or replace) a table and persist it.
pub async fn add_table(
    State(state): State<AppState>,
    Json(body): Json<AddTableBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let table = body.table.ok_or_else(|| ApiError::bad_request("missing field `table`"))?;
    let file = parse_table_payload(table).inspect_err(|e| warn!(error = %e.message, "rejected table"))?;

    state.store.write().await.add_table(file)?;

    Ok(Json(MessageResponse { message: "Tables added successfully".to_owned() }))
}

/// `GET /tables`: sorted table names.
pub async fn list_tables(State(state): State<AppState>) -> Json<TablesResponse> {
    Json(TablesResponse { tables: state.store.read().await.names() })
}

/// `GET /draw/{name}`: roll on a table; returns the roll and resolved text.
pub async fn draw(State(state): State<AppState>, Path(name): Path<String>) -> Result<Json<DrawResponse>, ApiError> {
    let store = state.store.read().await;
    let result = store.draw(&name, &mut rand::rng())?;
    Ok(Json(DrawResponse { result }))
}

/// `GET /formatted_draw/{name}`: roll on a table; returns `"<roll> : <text>"`.
pub async fn formatted_draw(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FormattedDrawResponse>, ApiError> {
    let store = state.store.read().await;
    let result = store.formatted_draw(&name, &mut rand::rng())?;
    Ok(Json(FormattedDrawResponse { result }))
}

/// `GET /table_entries/{name}`: the table's rows.
pub async fn table_entries(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<EntriesResponse>, ApiError> {
    let store = state.store.read().await;
    let entries = store.entries(&name)?.to_vec();
    Ok(Json(EntriesResponse { entries }))
}

#[cfg(test)]
#[path = "tables_test.rs"]
mod tests;

//! Wire DTOs for the table service.
//!
//! DESIGN
//! ======
//! Draw results and entry targets are owned by the server, so they stay as
//! raw `serde_json::Value` here and are only turned into text for display
//! by [`display_value`].

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /draw/{t}` and `GET /formatted_draw/{t}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawResponse {
    pub result: Value,
}

/// `GET /tables`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

/// `GET /table_entries/{t}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntriesResponse {
    pub entries: Vec<TableEntry>,
}

/// One table row as the server reports it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Entry type (`text` or `document`). Carried but not displayed.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub min_roll: i64,
    pub max_roll: i64,
    pub target: Value,
}

impl TableEntry {
    /// `"3"` for a single roll, `"2-5"` for a range.
    #[must_use]
    pub fn range_label(&self) -> String {
        tables::table::range_label(self.min_roll, self.max_roll)
    }
}

/// `POST /addTable` request body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddTableRequest {
    pub table: Value,
}

/// `POST /addTable` success body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body returned with any 4xx/5xx status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Text shown for an opaque server value: strings as-is, anything else as
/// compact JSON.
#[must_use]
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

//! JSON table files: `{ "name", "formula", "results": [{ "type", "text", "range" }] }`.

use std::path::Path;

use super::{FormatError, TableFile};
use crate::table::RandomTable;

/// # Errors
///
/// Fails if the text is not a valid table definition.
pub fn from_json_str(text: &str) -> Result<RandomTable, FormatError> {
    let file: TableFile = serde_json::from_str(text)?;
    Ok(file.into_table()?)
}

/// Pretty-printed JSON for a table.
///
/// # Errors
///
/// Propagates serializer failures.
pub fn to_json_string(table: &RandomTable) -> Result<String, FormatError> {
    Ok(serde_json::to_string_pretty(&TableFile::from(table))?)
}

/// # Errors
///
/// Fails on I/O errors or an invalid definition.
pub fn load_json_file(path: &Path) -> Result<RandomTable, FormatError> {
    let text = std::fs::read_to_string(path)?;
    from_json_str(&text)
}

/// # Errors
///
/// Fails on I/O errors.
pub fn save_json_file(table: &RandomTable, path: &Path) -> Result<(), FormatError> {
    std::fs::write(path, to_json_string(table)?)?;
    Ok(())
}

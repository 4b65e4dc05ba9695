//! On-disk table formats: JSON (canonical), TSV (hand-edited), Markdown (export only).
//!
//! The JSON shape is also the `/addTable` payload, so [`TableFile`] doubles
//! as the wire type for table creation.

pub mod json;
pub mod markdown;
pub mod tsv;

use serde::{Deserialize, Serialize};

use crate::dice::Formula;
use crate::table::{Entry, EntryKind, RandomTable, TableError};

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON table: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TSV table: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: invalid roll range `{range}`")]
    InvalidRange { line: u64, range: String },
    #[error("line {line}: missing result text")]
    MissingText { line: u64 },
    #[error("line {line}: unknown entry type `{kind}`")]
    UnknownKind { line: u64, kind: String },
    #[error("table `{table}`: text {text:?} cannot be written as TSV")]
    UnwritableText { table: String, text: String },
    #[error("table has no entries")]
    NoEntries,
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Serialized table definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFile {
    pub name: String,
    pub formula: String,
    pub results: Vec<ResultRow>,
}

/// Serialized entry. `range` is inclusive `[min, max]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "type", default)]
    pub kind: EntryKind,
    pub text: String,
    pub range: [i64; 2],
}

impl TableFile {
    /// Validate into a table.
    ///
    /// # Errors
    ///
    /// Fails on a blank name, an invalid formula, or an inverted range.
    pub fn into_table(self) -> Result<RandomTable, TableError> {
        let formula = Formula::parse(&self.formula)?;
        let entries = self
            .results
            .into_iter()
            .map(|row| Entry::new(row.kind, row.range[0], row.range[1], row.text))
            .collect::<Result<Vec<_>, _>>()?;
        RandomTable::new(self.name, formula, entries)
    }
}

impl From<&RandomTable> for TableFile {
    fn from(table: &RandomTable) -> Self {
        Self {
            name: table.name.clone(),
            formula: table.formula.source().to_owned(),
            results: table
                .entries
                .iter()
                .map(|e| ResultRow { kind: e.kind, text: e.target.clone(), range: [e.min_roll, e.max_roll] })
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

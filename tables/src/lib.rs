//! # tables
//!
//! Random roll tables for tabletop games: a dice formula language, the
//! table model with linked tables, JSON/TSV/Markdown formats, and a
//! directory-backed store shared by the HTTP service and the CLI.

pub mod dice;
pub mod format;
pub mod refs;
pub mod store;
pub mod table;

pub use dice::{DiceError, Formula, Roll};
pub use format::{FormatError, ResultRow, TableFile};
pub use store::{ExportFormat, LoadReport, StoreError, TableStore};
pub use table::{Draw, Entry, EntryKind, RandomTable, TableError, TableMap};

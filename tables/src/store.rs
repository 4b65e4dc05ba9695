//! Directory-backed table store.
//!
//! DESIGN
//! ======
//! Tables live in memory keyed by name and are loaded from `.json`, `.tsv`
//! and `.txt` files found recursively under a directory. Tables added at
//! runtime are persisted back to that directory as `<name>.json`, so a
//! restart sees them again. Other files in the directory that supplied the
//! same name would shadow that file on reload, so they are moved aside to
//! `<file>.bak`.
//!
//! ERROR HANDLING
//! ==============
//! Loading is best effort: a file that fails to parse is logged and
//! skipped so one bad table never hides the rest. Adding a table is strict:
//! validation and persistence errors are returned to the caller.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{info, warn};

use crate::format::{FormatError, TableFile, json, markdown, tsv};
use crate::table::{Draw, Entry, RandomTable, TableError, TableMap};

const TABLE_EXTENSIONS: &[&str] = &["json", "tsv", "txt"];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("table not found: {0}")]
    NotFound(String),
    #[error("invalid table name: {0:?}")]
    InvalidName(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Outcome of loading a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// Output format for bulk export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Tsv,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Tsv => "tsv",
            Self::Markdown => "md",
        }
    }
}

pub struct TableStore {
    dir: PathBuf,
    tables: TableMap,
    /// Every file each table name was loaded from, in load order.
    sources: BTreeMap<String, Vec<PathBuf>>,
}

// =============================================================================
// LOADING
// =============================================================================

impl TableStore {
    /// Empty store persisting into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), tables: BTreeMap::new(), sources: BTreeMap::new() }
    }

    /// Store backed by `dir`, preloaded with every table found there.
    /// A missing directory yields an empty store.
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let mut store = Self::new(dir);
        let dir = store.dir.clone();
        let report = store.load(&dir);
        info!(dir = %dir.display(), loaded = report.loaded, skipped = report.skipped, "table store opened");
        store
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load every table file under `dir`, replacing same-named tables.
    pub fn load(&mut self, dir: &Path) -> LoadReport {
        let mut report = LoadReport::default();
        let mut files = Vec::new();
        if let Err(e) = find_table_files(dir, &mut files) {
            warn!(dir = %dir.display(), error = %e, "cannot read table directory");
            return report;
        }
        files.sort();

        for path in files {
            match load_table_file(&path) {
                Ok(table) => {
                    info!(path = %path.display(), table = %table.name, "loaded table");
                    self.sources.entry(table.name.clone()).or_default().push(path);
                    self.tables.insert(table.name.clone(), table);
                    report.loaded += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping table file");
                    report.skipped += 1;
                }
            }
        }
        report
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Validate, insert and persist a table definition.
    ///
    /// # Errors
    ///
    /// Fails on an unsafe name, an invalid definition, or a write error.
    pub fn add_table(&mut self, file: TableFile) -> Result<&RandomTable, StoreError> {
        validate_name(&file.name)?;
        let table = file.into_table()?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", table.name));
        json::save_json_file(&table, &path)?;
        info!(table = %table.name, path = %path.display(), "table added");

        let name = table.name.clone();
        self.retire_sources(&name, &path)?;
        for paths in self.sources.values_mut() {
            paths.retain(|p| p != &path);
        }
        self.sources.insert(name.clone(), vec![path]);
        self.tables.insert(name.clone(), table);
        self.get(&name)
    }

    /// Move aside files under the store directory that also define `name`,
    /// keeping `kept`.
    fn retire_sources(&self, name: &str, kept: &Path) -> Result<(), StoreError> {
        let Some(paths) = self.sources.get(name) else {
            return Ok(());
        };
        for path in paths.iter().filter(|p| p.as_path() != kept && p.starts_with(&self.dir)) {
            let mut backup = path.clone().into_os_string();
            backup.push(".bak");
            match std::fs::rename(path, &backup) {
                Ok(()) => info!(table = %name, path = %path.display(), "replaced table file moved aside"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Table names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown name.
    pub fn get(&self, name: &str) -> Result<&RandomTable, StoreError> {
        self.tables.get(name).ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown name.
    pub fn entries(&self, name: &str) -> Result<&[Entry], StoreError> {
        Ok(&self.get(name)?.entries)
    }

    /// Draw on a table, resolving links against the whole store.
    ///
    /// # Errors
    ///
    /// Fails for an unknown table or a failed draw.
    pub fn draw<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Result<Draw, StoreError> {
        Ok(self.get(name)?.draw(rng, Some(&self.tables))?)
    }

    /// # Errors
    ///
    /// Fails for an unknown table or a failed draw.
    pub fn formatted_draw<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Result<String, StoreError> {
        Ok(self.get(name)?.formatted_draw(rng, Some(&self.tables))?)
    }

    // =========================================================================
    // EXPORT
    // =========================================================================

    /// Write one file per table into `dir`, creating it if needed.
    /// Returns the number of files written.
    ///
    /// # Errors
    ///
    /// Fails on the first write error.
    pub fn export(&self, dir: &Path, format: ExportFormat) -> Result<usize, StoreError> {
        std::fs::create_dir_all(dir)?;
        for (name, table) in &self.tables {
            let path = dir.join(format!("{name}.{}", format.extension()));
            match format {
                ExportFormat::Json => json::save_json_file(table, &path)?,
                ExportFormat::Tsv => tsv::save_tsv_file(table, &path)?,
                ExportFormat::Markdown => std::fs::write(&path, markdown::to_markdown(table))?,
            }
        }
        info!(dir = %dir.display(), count = self.tables.len(), ?format, "tables exported");
        Ok(self.tables.len())
    }
}

/// Names become file names, so they must not escape the store directory.
fn validate_name(name: &str) -> Result<(), StoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed == "." || trimmed.contains("..") || trimmed.contains(['/', '\\', '\0']) {
        return Err(StoreError::InvalidName(name.to_owned()));
    }
    Ok(())
}

fn find_table_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            find_table_files(&path, out)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| TABLE_EXTENSIONS.contains(&ext))
        {
            out.push(path);
        }
    }
    Ok(())
}

fn load_table_file(path: &Path) -> Result<RandomTable, FormatError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => json::load_json_file(path),
        _ => tsv::load_tsv_file(path),
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

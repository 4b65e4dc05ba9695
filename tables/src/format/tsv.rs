//! Tab-separated table files.
//!
//! One entry per line: `range<TAB>text[<TAB>type]`, where `range` is `n` or
//! `min-max`. Two optional directive lines may precede the entries:
//! `# name: ...` and `# formula: ...`. Without them the name comes from the
//! caller (usually the file stem) and the formula is guessed from the range
//! bounds. Other `#` lines are comments.
//!
//! Fields are never quoted: a `"` is literal text. Text containing a tab or
//! a line break therefore cannot be written as TSV.

use std::path::Path;

use crate::dice::{Formula, guess_formula};
use crate::table::{Entry, EntryKind, RandomTable, TableError};

use super::FormatError;

const NAME_DIRECTIVE: &str = "# name:";
const FORMULA_DIRECTIVE: &str = "# formula:";

/// Parse TSV text. `default_name` is used when no `# name:` line is present.
///
/// # Errors
///
/// Fails on malformed rows, an empty table, or an invalid formula.
pub fn from_tsv_str(default_name: &str, text: &str) -> Result<RandomTable, FormatError> {
    let mut name = default_name.to_owned();
    let mut formula = None;
    for line in text.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix(NAME_DIRECTIVE) {
            name = rest.trim().to_owned();
        } else if let Some(rest) = line.strip_prefix(FORMULA_DIRECTIVE) {
            formula = Some(rest.trim().to_owned());
        }
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, csv::Position::line);
        let range = record.get(0).unwrap_or_default();
        if range.is_empty() && record.len() <= 1 {
            continue;
        }
        let (min, max) = parse_range(range).ok_or_else(|| FormatError::InvalidRange { line, range: range.to_owned() })?;
        let text = record.get(1).filter(|t| !t.is_empty()).ok_or(FormatError::MissingText { line })?;
        let kind = match record.get(2).unwrap_or_default() {
            "" | "text" => EntryKind::Text,
            "document" => EntryKind::Document,
            other => return Err(FormatError::UnknownKind { line, kind: other.to_owned() }),
        };
        entries.push(Entry::new(kind, min, max, text)?);
    }

    if entries.is_empty() {
        return Err(FormatError::NoEntries);
    }

    let source = formula.as_deref().unwrap_or("1");
    let mut table = RandomTable::new(name, Formula::parse(source).map_err(TableError::from)?, entries)?;
    if formula.is_none()
        && let Some((min, max)) = table.roll_bounds()
    {
        table.formula = Formula::parse(&guess_formula(min, max)).map_err(TableError::from)?;
    }
    Ok(table)
}

/// Render a table as TSV including name and formula directives.
///
/// # Errors
///
/// Fails on text holding a tab or line break, or on writer failures.
pub fn to_tsv_string(table: &RandomTable) -> Result<String, FormatError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(Vec::new());
    for entry in &table.entries {
        if entry.target.contains(['\t', '\n', '\r']) {
            return Err(FormatError::UnwritableText { table: table.name.clone(), text: entry.target.clone() });
        }
        writer.write_record([entry.range_label().as_str(), entry.target.as_str(), entry.kind.as_str()])?;
    }
    let body = writer.into_inner().map_err(|e| FormatError::Io(e.into_error()))?;
    Ok(format!(
        "{NAME_DIRECTIVE} {}\n{FORMULA_DIRECTIVE} {}\n{}",
        table.name,
        table.formula,
        String::from_utf8_lossy(&body)
    ))
}

/// Load a TSV file, naming the table after the file stem unless overridden.
///
/// # Errors
///
/// Fails on I/O errors or malformed content.
pub fn load_tsv_file(path: &Path) -> Result<RandomTable, FormatError> {
    let text = std::fs::read_to_string(path)?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    from_tsv_str(stem, &text)
}

/// # Errors
///
/// Fails on I/O errors.
pub fn save_tsv_file(table: &RandomTable, path: &Path) -> Result<(), FormatError> {
    std::fs::write(path, to_tsv_string(table)?)?;
    Ok(())
}

/// `n` or `min-max`; either bound may be negative (`-2--1`).
fn parse_range(range: &str) -> Option<(i64, i64)> {
    let split = range
        .char_indices()
        .find(|&(i, c)| c == '-' && range[..i].trim_end().ends_with(|d: char| d.is_ascii_digit()));
    match split {
        Some((i, _)) => Some((range[..i].trim().parse().ok()?, range[i + 1..].trim().parse().ok()?)),
        None => {
            let n = range.parse().ok()?;
            Some((n, n))
        }
    }
}

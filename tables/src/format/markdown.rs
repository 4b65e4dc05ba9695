//! Markdown export for sharing tables in notes and wikis.

use std::fmt::Write;

use crate::table::{EntryKind, RandomTable};

/// Render a table as a Markdown document with a `Roll | Result` table.
#[must_use]
pub fn to_markdown(table: &RandomTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", table.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "Roll: `{}`", table.formula);
    let _ = writeln!(out);
    let _ = writeln!(out, "| Roll | Result |");
    let _ = writeln!(out, "| ---: | --- |");
    for entry in &table.entries {
        let target = escape_cell(&entry.target);
        let cell = match entry.kind {
            EntryKind::Text => target,
            EntryKind::Document => format!("See: {target}"),
        };
        let _ = writeln!(out, "| {} | {cell} |", entry.range_label());
    }
    out
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace("\r\n", "<br>").replace('\n', "<br>")
}

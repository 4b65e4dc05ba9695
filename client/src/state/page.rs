//! Rendered state of the roll table page.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each field stands in for one page element:
//!
//! | Element          | Field                         |
//! |------------------|-------------------------------|
//! | `tableName`      | `table_names` + `selected`    |
//! | `tableJson`      | `table_json`                  |
//! | `result`         | `result`                      |
//! | `entryTableBody` | `entries`                     |
//!
//! DESIGN
//! ======
//! Requests for the same element may overlap. [`Tickets`] hands out a
//! sequence number per element when a request starts; a response is only
//! applied if its ticket is newer than the last one applied to that
//! element, so the most recently started request always wins.

#[cfg(test)]
#[path = "page_test.rs"]
mod page_test;

use crate::net::types::{TableEntry, display_value};

pub const ERROR_FETCHING_DATA: &str = "Error fetching data";
pub const INVALID_JSON_FORMAT: &str = "Invalid JSON format";
pub const ERROR_ADDING_TABLE: &str = "Error adding table";
pub const ERROR_FETCHING_TABLES: &str = "Error fetching tables";
pub const ERROR_FETCHING_ENTRIES: &str = "Error fetching entries";

const FAILURE_TEXTS: &[&str] =
    &[ERROR_FETCHING_DATA, INVALID_JSON_FORMAT, ERROR_ADDING_TABLE, ERROR_FETCHING_TABLES, ERROR_FETCHING_ENTRIES];

/// One rendered entry row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryRow {
    /// `"3"` or `"2-5"`.
    pub range: String,
    pub target: String,
}

impl From<&TableEntry> for EntryRow {
    fn from(entry: &TableEntry) -> Self {
        Self { range: entry.range_label(), target: display_value(&entry.target) }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageView {
    /// Dropdown options, sorted.
    pub table_names: Vec<String>,
    /// Selected dropdown option.
    pub selected: Option<String>,
    /// Contents of the table definition text field.
    pub table_json: String,
    /// Result line.
    pub result: String,
    pub entries: Vec<EntryRow>,
}

impl PageView {
    /// Replace every dropdown option. Names are sorted and deduplicated;
    /// the selection survives if still listed, otherwise moves to the
    /// first option.
    pub fn replace_options(&mut self, mut names: Vec<String>) {
        names.sort();
        names.dedup();
        let keep = self.selected.as_ref().is_some_and(|s| names.contains(s));
        if !keep {
            self.selected = names.first().cloned();
        }
        self.table_names = names;
    }

    pub fn replace_entries(&mut self, entries: &[TableEntry]) {
        self.entries = entries.iter().map(EntryRow::from).collect();
    }

    /// Whether the result line currently shows a failure message.
    #[must_use]
    pub fn result_is_failure(&self) -> bool {
        FAILURE_TEXTS.contains(&self.result.as_str())
    }
}

// =============================================================================
// REQUEST SEQUENCING
// =============================================================================

/// Page element a response writes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    Result,
    Options,
    Entries,
}

/// Sequence number for one in-flight request against one element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    element: Element,
    seq: u64,
}

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    issued: u64,
    applied: u64,
}

#[derive(Clone, Debug, Default)]
pub struct Tickets {
    result: Slot,
    options: Slot,
    entries: Slot,
}

impl Tickets {
    fn slot(&mut self, element: Element) -> &mut Slot {
        match element {
            Element::Result => &mut self.result,
            Element::Options => &mut self.options,
            Element::Entries => &mut self.entries,
        }
    }

    /// Start a request against `element`.
    pub fn issue(&mut self, element: Element) -> Ticket {
        let slot = self.slot(element);
        slot.issued += 1;
        Ticket { element, seq: slot.issued }
    }

    /// Whether a response holding `ticket` may be written. Accepting marks
    /// every older ticket for the same element as stale.
    pub fn accept(&mut self, ticket: Ticket) -> bool {
        let slot = self.slot(ticket.element);
        if ticket.seq > slot.applied {
            slot.applied = ticket.seq;
            true
        } else {
            false
        }
    }
}

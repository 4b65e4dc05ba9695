//! Roll table page: draw on a table, browse its entries, add new tables.
//!
//! DESIGN
//! ======
//! Every action reads what it needs from the view and takes a ticket for
//! each element it may write, releases the lock, awaits one request, then
//! re-locks to write an element only if that ticket is still current. List
//! and entry requests may write failure text into the result line, so they
//! take a result ticket up front like draws do. Actions never return errors: failures are logged and the
//! page shows a fixed message in the result line, so the user can simply
//! retry.
//!
//! ERROR HANDLING
//! ==============
//! | Action          | Failure text             |
//! |-----------------|--------------------------|
//! | draw            | `Error fetching data`    |
//! | submit (parse)  | `Invalid JSON format`    |
//! | submit (server) | `Error adding table`     |
//! | table list      | `Error fetching tables`  |
//! | entries         | `Error fetching entries` |

#[cfg(test)]
#[path = "table_page_test.rs"]
mod table_page_test;

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tables::TableFile;
use tracing::{debug, warn};

use crate::net::api::TablesApi;
use crate::net::types::display_value;
use crate::state::page::{
    ERROR_ADDING_TABLE, ERROR_FETCHING_DATA, ERROR_FETCHING_ENTRIES, ERROR_FETCHING_TABLES, Element,
    INVALID_JSON_FORMAT, PageView, Ticket, Tickets,
};

/// Why a table definition was refused before sending.
#[derive(Debug, thiserror::Error)]
pub enum TableJsonError {
    #[error("not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("not a table definition: {0}")]
    Shape(serde_json::Error),
    #[error(transparent)]
    Table(#[from] tables::TableError),
}

/// Parse and validate table definition text. Returns the parsed JSON
/// exactly as typed, ready to send.
///
/// # Errors
///
/// Fails on malformed JSON, a value that is not a table file, or a table
/// file that does not build (bad formula, inverted range, blank name).
pub fn validate_table_json(text: &str) -> Result<Value, TableJsonError> {
    let value: Value = serde_json::from_str(text)?;
    let file: TableFile = serde_json::from_value(value.clone()).map_err(TableJsonError::Shape)?;
    file.into_table()?;
    Ok(value)
}

#[derive(Default)]
struct PageInner {
    view: PageView,
    tickets: Tickets,
}

pub struct TablePage<A> {
    api: A,
    inner: Mutex<PageInner>,
}

impl<A: TablesApi> TablePage<A> {
    #[must_use]
    pub fn new(api: A) -> Self {
        Self { api, inner: Mutex::new(PageInner::default()) }
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Snapshot of the rendered page.
    #[must_use]
    pub fn view(&self) -> PageView {
        self.lock().view.clone()
    }

    fn lock(&self) -> MutexGuard<'_, PageInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tickets for `element` and for the result line, taken together.
    fn issue_with_result(&self, element: Element) -> (Ticket, Ticket) {
        let mut inner = self.lock();
        (inner.tickets.issue(element), inner.tickets.issue(Element::Result))
    }

    fn apply_result(&self, ticket: Ticket, text: impl Into<String>) {
        write_result(&mut self.lock(), ticket, text);
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Page load: fill the dropdown, then list the selected table's entries.
    pub async fn load(&self) {
        self.refresh_tables().await;
        let selected = self.lock().view.selected.clone();
        if let Some(name) = selected {
            self.show_entries(&name).await;
        }
    }

    /// Refetch the table list and replace every option.
    pub async fn refresh_tables(&self) {
        let (ticket, result) = self.issue_with_result(Element::Options);
        let outcome = self.api.tables().await;

        let mut inner = self.lock();
        if !inner.tickets.accept(ticket) {
            debug!("stale table list dropped");
            return;
        }
        match outcome {
            Ok(names) => inner.view.replace_options(names),
            Err(e) => {
                warn!(error = %e, "failed to fetch tables");
                write_result(&mut inner, result, ERROR_FETCHING_TABLES);
            }
        }
    }

    /// Set the dropdown value without listing entries.
    pub fn select(&self, name: &str) {
        self.lock().view.selected = Some(name.to_owned());
    }

    /// Dropdown change: select `name` and list its entries.
    pub async fn select_table(&self, name: &str) {
        self.select(name);
        self.show_entries(name).await;
    }

    /// Rebuild the entry rows for `name`.
    pub async fn show_entries(&self, name: &str) {
        let (ticket, result) = self.issue_with_result(Element::Entries);
        let outcome = self.api.table_entries(name).await;

        let mut inner = self.lock();
        if !inner.tickets.accept(ticket) {
            debug!(table = %name, "stale entries dropped");
            return;
        }
        match outcome {
            Ok(entries) => inner.view.replace_entries(&entries),
            Err(e) => {
                warn!(table = %name, error = %e, "failed to fetch entries");
                inner.view.entries.clear();
                write_result(&mut inner, result, ERROR_FETCHING_ENTRIES);
            }
        }
    }

    /// Draw on the selected table: `Result: <value>`.
    pub async fn draw(&self) {
        self.roll(false).await;
    }

    /// Formatted draw on the selected table: `Formatted Result: <value>`.
    pub async fn formatted_draw(&self) {
        self.roll(true).await;
    }

    async fn roll(&self, formatted: bool) {
        let (ticket, selected) = {
            let mut inner = self.lock();
            (inner.tickets.issue(Element::Result), inner.view.selected.clone())
        };
        let Some(name) = selected else {
            warn!("draw requested with no table selected");
            self.apply_result(ticket, ERROR_FETCHING_DATA);
            return;
        };

        let outcome = if formatted { self.api.formatted_draw(&name).await } else { self.api.draw(&name).await };
        match outcome {
            Ok(value) => {
                let prefix = if formatted { "Formatted Result" } else { "Result" };
                self.apply_result(ticket, format!("{prefix}: {}", display_value(&value)));
            }
            Err(e) => {
                warn!(table = %name, formatted, error = %e, "draw failed");
                self.apply_result(ticket, ERROR_FETCHING_DATA);
            }
        }
    }

    /// Replace the table definition text field.
    pub fn set_table_json(&self, text: impl Into<String>) {
        self.lock().view.table_json = text.into();
    }

    /// Form submit: validate the definition, send it, then refresh the list.
    /// Malformed input is never sent.
    pub async fn submit_table(&self) {
        let (ticket, text) = {
            let mut inner = self.lock();
            (inner.tickets.issue(Element::Result), inner.view.table_json.clone())
        };

        let table = match validate_table_json(&text) {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "invalid table definition");
                self.apply_result(ticket, INVALID_JSON_FORMAT);
                return;
            }
        };

        match self.api.add_table(table).await {
            Ok(message) => {
                self.apply_result(ticket, message);
                self.refresh_tables().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to add table");
                self.apply_result(ticket, ERROR_ADDING_TABLE);
            }
        }
    }
}

fn write_result(inner: &mut PageInner, ticket: Ticket, text: impl Into<String>) {
    if inner.tickets.accept(ticket) {
        inner.view.result = text.into();
    } else {
        debug!("stale result dropped");
    }
}

//! # client
//!
//! Typed client for the roll table service and the page model that drives
//! it. The page model is host-agnostic: a browser binding, a terminal or a
//! test harness reads [`PageView`] and calls the [`TablePage`] actions.

pub mod net;
pub mod pages;
pub mod state;

pub use net::api::{ApiError, HttpApi, TablesApi};
pub use net::config::ClientConfig;
pub use pages::table_page::TablePage;
pub use state::page::{EntryRow, PageView};

//! Page controllers.
//!
//! SYSTEM CONTEXT
//! ==============
//! A controller owns the page state and performs the page actions against
//! a [`crate::TablesApi`]. Rendering is left to the host.

pub mod table_page;

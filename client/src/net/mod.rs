//! Networking modules for the table service HTTP API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` issues requests, `config` reads connection settings from the
//! environment, and `types` defines the wire schema.

pub mod api;
pub mod config;
pub mod types;

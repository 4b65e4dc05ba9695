//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the table store behind a `RwLock`: draws and listings share
//! read access, while `/addTable` and `/load` take the write lock.

use std::path::PathBuf;
use std::sync::Arc;

use tables::TableStore;
use tokio::sync::RwLock;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<TableStore>>,
    /// Directory `/load` reads when the request names none.
    pub default_dir: PathBuf,
}

impl AppState {
    #[must_use]
    pub fn new(store: TableStore) -> Self {
        let default_dir = store.dir().to_path_buf();
        Self { store: Arc::new(RwLock::new(store)), default_dir }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

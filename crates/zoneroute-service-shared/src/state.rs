//! Application state shared by every axum handler.

use std::path::Path;
use std::sync::Arc;

use zoneroute_lib::{Error as LibError, SqliteZoneStore, ZoneStore};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// The zone store could not be opened.
    StoreOpen(LibError),

    /// Seed data could not be loaded into an empty store.
    Seed(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreOpen(e) => write!(f, "failed to open zone store: {}", e),
            Self::Seed(e) => write!(f, "failed to seed zone store: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::StoreOpen(e) | Self::Seed(e) => Some(e),
        }
    }
}

/// Shared application state.
///
/// Cheap to clone. Holds only the store handle: every query fetches its own
/// snapshot, so nothing graph-shaped lives here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn ZoneStore>,
    description: String,
}

impl AppState {
    /// Open (creating if needed) the SQLite store at `db_path`.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, AppStateError> {
        let db_path = db_path.as_ref();
        tracing::info!(path = %db_path.display(), "opening zone store");

        let store = if db_path.exists() {
            SqliteZoneStore::open(db_path)
        } else {
            SqliteZoneStore::create(db_path)
        }
        .map_err(AppStateError::StoreOpen)?;

        Ok(Self::from_store_with_description(
            store,
            format!("sqlite:{}", db_path.display()),
        ))
    }

    /// Wrap an arbitrary store, e.g. an in-test fixture.
    pub fn from_store(store: impl ZoneStore + 'static) -> Self {
        Self::from_store_with_description(store, "custom".to_string())
    }

    fn from_store_with_description(store: impl ZoneStore + 'static, description: String) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Arc::new(store),
                description,
            }),
        }
    }

    /// Load the seed document at `path` if the store has no zones yet.
    ///
    /// Returns the number of zones loaded (zero when the store was already
    /// populated).
    pub fn seed_if_empty(&self, path: impl AsRef<Path>) -> Result<usize, AppStateError> {
        let path = path.as_ref();
        let existing = self.inner.store.list_zones().map_err(AppStateError::Seed)?;
        if !existing.is_empty() {
            tracing::info!(zones = existing.len(), "store already populated, skipping seed");
            return Ok(0);
        }

        let seed = zoneroute_lib::seed_from_json(self.inner.store.as_ref(), path)
            .map_err(AppStateError::Seed)?;
        tracing::info!(
            path = %path.display(),
            zones = seed.zones.len(),
            connections = seed.connections.len(),
            "seeded zone store"
        );
        Ok(seed.zones.len())
    }

    /// Handle to the store, suitable for moving onto the blocking pool.
    pub fn store(&self) -> Arc<dyn ZoneStore> {
        Arc::clone(&self.inner.store)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.inner.description)
            .finish()
    }
}

//! Fixtures for handler tests.
//!
//! Each call to [`test_state`] gets its own SQLite file seeded from the sample
//! city network, so mutation tests never interfere with each other.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::state::AppState;

/// Path to the sample city seed document.
pub const TEST_SEED_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../docs/fixtures/city_seed.json"
);

/// Seeded state plus the directory holding its database. Keep the
/// [`TempDir`] alive for as long as the state is used.
///
/// # Panics
///
/// Panics if the fixture cannot be loaded, which indicates a broken test setup.
pub fn test_state() -> (TempDir, AppState) {
    let dir = TempDir::new().expect("create temp dir for test store");
    let state = AppState::open(dir.path().join("zones.db"))
        .unwrap_or_else(|e| panic!("failed to create test store: {}", e));
    state
        .seed_if_empty(fixture_seed_path())
        .unwrap_or_else(|e| panic!("failed to seed test store: {}", e));
    (dir, state)
}

/// State over an empty store.
pub fn empty_state() -> (TempDir, AppState) {
    let dir = TempDir::new().expect("create temp dir for test store");
    let state = AppState::open(dir.path().join("zones.db"))
        .unwrap_or_else(|e| panic!("failed to create test store: {}", e));
    (dir, state)
}

pub fn fixture_seed_path() -> PathBuf {
    PathBuf::from(TEST_SEED_PATH)
}

/// Zone names in the sample city network.
pub mod fixture_zones {
    /// Commercial centre; reaches every zone except `ISLA`.
    pub const CENTRO: &str = "Centro";

    pub const NORTE: &str = "Norte";

    pub const PUERTO: &str = "Puerto";

    /// Reached from `CENTRO` via `PUERTO`; the direct street is closed.
    pub const SUR: &str = "Sur";

    /// Isolated zone without streets.
    pub const ISLA: &str = "Isla";

    /// Distribution centre linked both ways to `CENTRO`.
    pub const HUB_CENTRAL: &str = "Hub Central";
}

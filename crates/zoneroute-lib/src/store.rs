//! Contract between the query engine and whatever persists the network.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::GraphSnapshot;
use crate::zone::{Connection, Zone};

/// Persistent home of zones and connections.
///
/// Every query calls [`ZoneStore::fetch_snapshot`] and works on the returned
/// copy; mutations made afterwards are only visible to later snapshots.
pub trait ZoneStore: Send + Sync {
    /// Capture the current network as an immutable graph.
    fn fetch_snapshot(&self) -> Result<GraphSnapshot>;

    /// All zones, ordered by name.
    fn list_zones(&self) -> Result<Vec<Zone>>;

    /// All stored arcs, ordered by source then target.
    fn list_connections(&self) -> Result<Vec<Connection>>;

    /// Arcs whose traffic level equals `traffic`, ignoring case.
    fn list_connections_by_traffic(&self, traffic: &str) -> Result<Vec<Connection>>;

    /// Insert a zone together with its connections, atomically.
    fn create_zone(&self, zone: &Zone, connections: &[Connection]) -> Result<()>;

    /// Close (`false`) or reopen (`true`) the arc `from -> to`.
    fn set_connection_accessible(&self, from: &str, to: &str, accessible: bool) -> Result<()>;

    /// Change the travel time of the arc `from -> to`.
    fn update_travel_time(&self, from: &str, to: &str, minutes: f64) -> Result<()>;

    /// Load a batch of zones and connections, atomically.
    fn apply_seed(&self, seed: &SeedData) -> Result<()>;
}

/// Initial network contents, usually read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl SeedData {
    /// Parse a seed document from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Read the seed document at `path` and load it into `store` in one batch.
pub fn seed_from_json(store: &dyn ZoneStore, path: &Path) -> Result<SeedData> {
    let seed = SeedData::from_path(path)?;
    store.apply_seed(&seed)?;
    Ok(seed)
}

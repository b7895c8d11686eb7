//! Zoneroute library entry points.
//!
//! This crate captures the delivery network from a [`ZoneStore`] as an
//! immutable [`GraphSnapshot`] and answers three questions over it: the
//! minimum travel-time route between two zones, which zones a source can reach
//! through open streets, and which zones it can reach within a time budget.
//! The CLI and the HTTP service should only depend on the functions exported
//! here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod db;
pub mod error;
pub mod frontier;
pub mod graph;
pub mod path;
pub mod reachability;
pub mod routing;
pub mod store;
pub mod window;
pub mod zone;

pub use db::SqliteZoneStore;
pub use error::{Error, Result};
pub use frontier::PriorityFrontier;
pub use graph::{Edge, GraphSnapshot, SnapshotBuilder, ZoneIdx};
pub use path::{compute_shortest_paths, reconstruct_path, Path, ShortestPathTree};
pub use reachability::{find_reachable, ReachabilitySet};
pub use routing::{
    plan_route, reachable_zones, zones_within, ReachabilityReport, RoutePlan, RouteRequest,
};
pub use store::{seed_from_json, SeedData, ZoneStore};
pub use window::find_within_budget;
pub use zone::{Connection, Direction, Zone, ZoneKind};

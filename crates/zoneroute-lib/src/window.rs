use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::graph::{GraphSnapshot, ZoneIdx};
use crate::path::{compute_shortest_paths, reconstruct_path, Path, ShortestPathTree};
use crate::reachability::{find_reachable, ReachabilitySet};

/// Every zone reachable from `source` in strictly less than `budget_minutes`,
/// keyed by destination. The source itself is never included.
///
/// A destination whose path cannot be rebuilt is logged and left out; the rest
/// of the batch is still returned.
pub fn find_within_budget(
    graph: &GraphSnapshot,
    source: ZoneIdx,
    budget_minutes: f64,
) -> Result<BTreeMap<ZoneIdx, Path>> {
    if !budget_minutes.is_finite() || budget_minutes <= 0.0 {
        return Err(Error::InvalidBudget {
            budget: budget_minutes,
        });
    }

    let reachable = find_reachable(graph, source);
    let tree = compute_shortest_paths(graph, source);
    Ok(collect_within_budget(
        graph,
        &reachable,
        &tree,
        source,
        budget_minutes,
    ))
}

/// Rebuild the path to every accessible zone other than `source` and keep
/// those under budget.
pub(crate) fn collect_within_budget(
    graph: &GraphSnapshot,
    reachable: &ReachabilitySet,
    tree: &ShortestPathTree,
    source: ZoneIdx,
    budget_minutes: f64,
) -> BTreeMap<ZoneIdx, Path> {
    let mut within = BTreeMap::new();
    let mut skipped = 0usize;
    for zone in reachable.accessible().filter(|&zone| zone != source) {
        match reconstruct_path(graph, tree, zone) {
            Ok(path) if path.minutes < budget_minutes => {
                within.insert(zone, path);
            }
            Ok(_) => {}
            Err(error) => {
                skipped += 1;
                warn!(
                    source = %graph.name_or_placeholder(source),
                    destination = %graph.name_or_placeholder(zone),
                    %error,
                    "skipping destination with unrecoverable path"
                );
            }
        }
    }

    debug!(
        source = %graph.name_or_placeholder(source),
        budget_minutes,
        accessible = reachable.accessible_count(),
        within = within.len(),
        skipped,
        "windowed reachability computed"
    );

    within
}

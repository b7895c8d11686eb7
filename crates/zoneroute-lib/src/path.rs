use tracing::debug;

use crate::error::{Error, Result};
use crate::frontier::PriorityFrontier;
use crate::graph::{GraphSnapshot, ZoneIdx};

/// Distance and predecessor tables produced by one single-source run.
///
/// Both tables are dense over the snapshot's zone universe. Unreached zones
/// keep `f64::INFINITY` and no predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPathTree {
    source: ZoneIdx,
    distances: Vec<f64>,
    predecessors: Vec<Option<ZoneIdx>>,
}

impl ShortestPathTree {
    pub fn source(&self) -> ZoneIdx {
        self.source
    }

    /// Best known cost from the source, or `None` if `zone` is not in the table.
    pub fn distance(&self, zone: ZoneIdx) -> Option<f64> {
        self.distances.get(zone.index()).copied()
    }

    /// Zone one hop closer to the source on the best path to `zone`.
    pub fn predecessor(&self, zone: ZoneIdx) -> Option<ZoneIdx> {
        self.predecessors.get(zone.index()).copied().flatten()
    }

    pub fn is_reachable(&self, zone: ZoneIdx) -> bool {
        self.distance(zone).is_some_and(f64::is_finite)
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn predecessors(&self) -> &[Option<ZoneIdx>] {
        &self.predecessors
    }

    #[cfg(test)]
    pub(crate) fn set_predecessor(&mut self, zone: ZoneIdx, predecessor: Option<ZoneIdx>) {
        self.predecessors[zone.index()] = predecessor;
    }
}

/// Ordered zones from source to destination plus total travel time.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub zones: Vec<ZoneIdx>,
    pub minutes: f64,
}

impl Path {
    pub fn hop_count(&self) -> usize {
        self.zones.len().saturating_sub(1)
    }
}

/// Run Dijkstra from `source` over accessible edges only.
pub fn compute_shortest_paths(graph: &GraphSnapshot, source: ZoneIdx) -> ShortestPathTree {
    let zone_count = graph.zone_count();
    let mut distances = vec![f64::INFINITY; zone_count];
    let mut predecessors: Vec<Option<ZoneIdx>> = vec![None; zone_count];
    let mut frontier = PriorityFrontier::with_capacity(zone_count);

    if source.index() < zone_count {
        distances[source.index()] = 0.0;
        frontier.push(source, 0.0);
    }

    let mut stale = 0usize;
    while let Some((zone, priority)) = frontier.pop_min() {
        let settled = distances[zone.index()];
        if priority > settled {
            stale += 1;
            continue;
        }

        for edge in graph.edges(zone).iter().filter(|edge| edge.accessible) {
            let candidate = settled + edge.minutes;
            let target = edge.target.index();
            if candidate < distances[target] {
                distances[target] = candidate;
                predecessors[target] = Some(zone);
                frontier.push(edge.target, candidate);
            }
        }
    }

    debug!(
        source = %graph.name_or_placeholder(source),
        zones = zone_count,
        stale_entries = stale,
        "shortest-path tree computed"
    );

    ShortestPathTree {
        source,
        distances,
        predecessors,
    }
}

/// Walk the predecessor table back from `destination` to the tree's source.
///
/// The walk is bounded by the number of zones so a corrupted table surfaces as
/// [`Error::ReconstructionLoop`] instead of spinning forever.
pub fn reconstruct_path(
    graph: &GraphSnapshot,
    tree: &ShortestPathTree,
    destination: ZoneIdx,
) -> Result<Path> {
    let Some(minutes) = tree.distance(destination) else {
        return Err(Error::UnknownDestination {
            name: graph.name_or_placeholder(destination),
            suggestions: Vec::new(),
        });
    };

    if !minutes.is_finite() {
        return Err(Error::Unreachable {
            source_zone: graph.name_or_placeholder(tree.source),
            destination: graph.name_or_placeholder(destination),
        });
    }

    let limit = tree.distances.len();
    let mut zones = vec![destination];
    let mut current = destination;
    while current != tree.source {
        let Some(previous) = tree.predecessor(current) else {
            return Err(Error::BrokenChain {
                destination: graph.name_or_placeholder(destination),
                at: graph.name_or_placeholder(current),
            });
        };
        zones.push(previous);
        if zones.len() > limit {
            return Err(Error::ReconstructionLoop {
                destination: graph.name_or_placeholder(destination),
                limit,
            });
        }
        current = previous;
    }

    zones.reverse();
    Ok(Path { zones, minutes })
}

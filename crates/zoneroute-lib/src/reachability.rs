use std::collections::VecDeque;

use crate::graph::{GraphSnapshot, ZoneIdx};

/// Partition of every zone in a snapshot into reachable and unreachable sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilitySet {
    reached: Vec<bool>,
}

impl ReachabilitySet {
    /// Whether `zone` can be reached through accessible edges.
    pub fn is_accessible(&self, zone: ZoneIdx) -> bool {
        self.reached.get(zone.index()).copied().unwrap_or(false)
    }

    /// Reached zones, in snapshot order.
    pub fn accessible(&self) -> impl Iterator<Item = ZoneIdx> + '_ {
        self.members(true)
    }

    /// Every other zone, in snapshot order.
    pub fn inaccessible(&self) -> impl Iterator<Item = ZoneIdx> + '_ {
        self.members(false)
    }

    pub fn accessible_count(&self) -> usize {
        self.reached.iter().filter(|&&reached| reached).count()
    }

    fn members(&self, wanted: bool) -> impl Iterator<Item = ZoneIdx> + '_ {
        self.reached
            .iter()
            .enumerate()
            .filter(move |&(_, &reached)| reached == wanted)
            .map(|(i, _)| ZoneIdx::from_index(i))
    }
}

/// Breadth-first search from `source` following accessible edges only.
///
/// A `source` foreign to `graph` reaches nothing, not even itself.
pub fn find_reachable(graph: &GraphSnapshot, source: ZoneIdx) -> ReachabilitySet {
    let mut reached = vec![false; graph.zone_count()];
    if source.index() >= reached.len() {
        return ReachabilitySet { reached };
    }

    let mut queue = VecDeque::new();
    reached[source.index()] = true;
    queue.push_back(source);

    while let Some(current) = queue.pop_front() {
        for edge in graph.edges(current) {
            if !edge.accessible || reached[edge.target.index()] {
                continue;
            }
            reached[edge.target.index()] = true;
            queue.push_back(edge.target);
        }
    }

    ReachabilitySet { reached }
}

/// Partition for a source that is not part of the snapshot.
pub fn nothing_reachable(graph: &GraphSnapshot) -> ReachabilitySet {
    ReachabilitySet {
        reached: vec![false; graph.zone_count()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(graph: &GraphSnapshot, zones: impl Iterator<Item = ZoneIdx>) -> Vec<String> {
        let mut names: Vec<String> = zones.map(|zone| graph.name(zone).to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn isolated_zone_is_inaccessible() {
        let graph = GraphSnapshot::builder()
            .edge("A", "B", 1.0, true)
            .expect("valid edge")
            .zone("Z")
            .build();
        let set = find_reachable(&graph, graph.lookup("A").unwrap());
        assert_eq!(names(&graph, set.accessible()), vec!["A", "B"]);
        assert_eq!(names(&graph, set.inaccessible()), vec!["Z"]);
    }

    #[test]
    fn closed_edges_are_not_followed() {
        let graph = GraphSnapshot::builder()
            .edge("A", "B", 1.0, false)
            .and_then(|b| b.edge("B", "C", 1.0, true))
            .expect("valid edges")
            .build();
        let set = find_reachable(&graph, graph.lookup("A").unwrap());
        assert_eq!(names(&graph, set.accessible()), vec!["A"]);
        assert_eq!(names(&graph, set.inaccessible()), vec!["B", "C"]);
    }

    #[test]
    fn cycles_visit_each_zone_once() {
        let graph = GraphSnapshot::builder()
            .edge("A", "B", 1.0, true)
            .and_then(|b| b.edge("B", "C", 1.0, true))
            .and_then(|b| b.edge("C", "A", 1.0, true))
            .expect("valid edges")
            .build();
        let set = find_reachable(&graph, graph.lookup("B").unwrap());
        assert_eq!(set.accessible_count(), 3);
        assert_eq!(set.inaccessible().count(), 0);
    }

    #[test]
    fn sink_source_reaches_only_itself() {
        let graph = GraphSnapshot::builder()
            .edge("A", "B", 1.0, true)
            .expect("valid edge")
            .build();
        let b = graph.lookup("B").unwrap();
        let set = find_reachable(&graph, b);
        assert!(set.is_accessible(b));
        assert_eq!(names(&graph, set.inaccessible()), vec!["A"]);
    }

    #[test]
    fn absent_source_reaches_nothing() {
        let graph = GraphSnapshot::builder()
            .edge("A", "B", 1.0, true)
            .expect("valid edge")
            .build();
        let set = nothing_reachable(&graph);
        assert_eq!(set.accessible_count(), 0);
        assert_eq!(set.inaccessible().count(), 2);
    }
}

//! Immutable, index-based graph snapshot used by every query.
//!
//! Zone names are interned into dense [`ZoneIdx`] values when the snapshot is
//! built, and outgoing edges are stored contiguously per zone (compressed
//! sparse row layout). The hot loops in [`crate::path`] and
//! [`crate::reachability`] only touch integer indices and edge slices.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// Dense identifier of a zone inside one snapshot.
///
/// Indices are only meaningful for the snapshot that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneIdx(u32);

impl ZoneIdx {
    /// Position of the zone in the snapshot's tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        // Snapshots are bounded by the store; u32 is far beyond any delivery network.
        Self(index as u32)
    }
}

/// Directed arc leaving a zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: ZoneIdx,
    /// Closed streets stay in the snapshot but are skipped by every traversal.
    pub accessible: bool,
    /// Travel time in minutes.
    pub minutes: f64,
}

/// Read-only directed weighted graph captured for a single query.
#[derive(Clone, Default)]
pub struct GraphSnapshot {
    names: Vec<String>,
    index: HashMap<String, ZoneIdx>,
    offsets: Vec<usize>,
    edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Start building a snapshot.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Number of zones known to the snapshot, sinks included.
    pub fn zone_count(&self) -> usize {
        self.names.len()
    }

    /// Number of directed arcs, accessible or not.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Resolve a zone name to its index.
    pub fn lookup(&self, name: &str) -> Option<ZoneIdx> {
        self.index.get(name).copied()
    }

    /// Name of the zone at `zone`.
    ///
    /// # Panics
    ///
    /// Panics if `zone` was produced by a different, larger snapshot.
    pub fn name(&self, zone: ZoneIdx) -> &str {
        &self.names[zone.index()]
    }

    /// Outgoing arcs of `zone`, including inaccessible ones.
    pub fn edges(&self, zone: ZoneIdx) -> &[Edge] {
        let i = zone.index();
        match (self.offsets.get(i), self.offsets.get(i + 1)) {
            (Some(&start), Some(&end)) => &self.edges[start..end],
            _ => &[],
        }
    }

    /// Every zone index in the snapshot, in interning order.
    pub fn zones(&self) -> impl Iterator<Item = ZoneIdx> + '_ {
        (0..self.names.len()).map(ZoneIdx::from_index)
    }

    /// Every zone name in the snapshot, in interning order.
    pub fn zone_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    /// Find the arc `from -> to`, if the snapshot has one.
    pub fn edge_between(&self, from: ZoneIdx, to: ZoneIdx) -> Option<&Edge> {
        self.edges(from).iter().find(|edge| edge.target == to)
    }

    /// Name of `zone`, or `#<index>` when the index is foreign to this snapshot.
    pub(crate) fn name_or_placeholder(&self, zone: ZoneIdx) -> String {
        match self.names.get(zone.index()) {
            Some(name) => name.clone(),
            None => format!("#{}", zone.index()),
        }
    }

    /// Suggest up to `limit` zone names similar to `name`, best match first.
    pub fn fuzzy_zone_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .names
            .iter()
            .map(|candidate| {
                let score = strsim::jaro_winkler(&needle, &candidate.to_lowercase());
                (score, candidate.as_str())
            })
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, candidate)| candidate.to_string())
            .collect()
    }
}

impl fmt::Debug for GraphSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphSnapshot")
            .field("zones", &self.names.len())
            .field("edges", &self.edges.len())
            .finish()
    }
}

/// Incrementally interns zones and arcs, then freezes them into a
/// [`GraphSnapshot`].
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    names: Vec<String>,
    index: HashMap<String, ZoneIdx>,
    arcs: Vec<(ZoneIdx, Edge)>,
}

impl SnapshotBuilder {
    /// Register a zone, returning its index. Registering twice is a no-op.
    pub fn add_zone(&mut self, name: &str) -> ZoneIdx {
        if let Some(&existing) = self.index.get(name) {
            return existing;
        }
        let idx = ZoneIdx::from_index(self.names.len());
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Register a directed arc. Unseen endpoints become zones; a target
    /// without arcs of its own is a sink.
    pub fn add_edge(&mut self, from: &str, to: &str, minutes: f64, accessible: bool) -> Result<()> {
        if !minutes.is_finite() || minutes < 0.0 {
            return Err(Error::InvalidConnection {
                from: from.to_string(),
                to: to.to_string(),
                reason: format!("travel time {minutes} must be a finite, non-negative number"),
            });
        }

        let source = self.add_zone(from);
        let target = self.add_zone(to);
        self.arcs.push((
            source,
            Edge {
                target,
                accessible,
                minutes,
            },
        ));
        Ok(())
    }

    /// Chainable form of [`SnapshotBuilder::add_zone`].
    pub fn zone(mut self, name: &str) -> Self {
        self.add_zone(name);
        self
    }

    /// Chainable form of [`SnapshotBuilder::add_edge`].
    pub fn edge(mut self, from: &str, to: &str, minutes: f64, accessible: bool) -> Result<Self> {
        self.add_edge(from, to, minutes, accessible)?;
        Ok(self)
    }

    /// Freeze the collected zones and arcs.
    pub fn build(self) -> GraphSnapshot {
        let zone_count = self.names.len();
        let mut offsets = vec![0usize; zone_count + 1];
        for (source, _) in &self.arcs {
            offsets[source.index() + 1] += 1;
        }
        for i in 0..zone_count {
            offsets[i + 1] += offsets[i];
        }

        let mut cursor = offsets.clone();
        let placeholder = Edge {
            target: ZoneIdx(0),
            accessible: false,
            minutes: 0.0,
        };
        let mut edges = vec![placeholder; self.arcs.len()];
        for (source, edge) in self.arcs {
            let slot = &mut cursor[source.index()];
            edges[*slot] = edge;
            *slot += 1;
        }

        GraphSnapshot {
            names: self.names,
            index: self.index,
            offsets,
            edges,
        }
    }
}

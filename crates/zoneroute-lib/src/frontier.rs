//! Minimum-priority work queue for the shortest-path engine.
//!
//! Decrease-key is lazy: a better priority is pushed as a new entry and the
//! obsolete one stays in the heap until it is popped. Callers discard stale
//! entries by comparing the popped priority with their distance table. This
//! trades a few extra heap entries (at most one per relaxation) for not
//! having to track heap positions.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::ZoneIdx;

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct FrontierEntry {
    zone: ZoneIdx,
    priority: FloatOrd,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the max-heap yields the smallest priority first.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.zone.cmp(&self.zone))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-heap of `(zone, priority)` pairs with lazy decrease-key.
///
/// The order among equal priorities is not part of the contract.
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    heap: BinaryHeap<FrontierEntry>,
}

impl PriorityFrontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Queue `zone` at `priority`. Earlier entries for the same zone are kept.
    pub fn push(&mut self, zone: ZoneIdx, priority: f64) {
        self.heap.push(FrontierEntry {
            zone,
            priority: FloatOrd(priority),
        });
    }

    /// Remove and return the entry with the smallest priority.
    pub fn pop_min(&mut self) -> Option<(ZoneIdx, f64)> {
        self.heap
            .pop()
            .map(|entry| (entry.zone, entry.priority.0))
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of queued entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }
}

//! Priority queue for BPE merge candidates.
//!
//! Entries are never removed eagerly. Every time a pair's frequency changes the
//! queue bumps that pair's version and pushes a fresh entry; entries carrying
//! an older version are skipped when they surface.

use crate::core::merges::Pair;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;

/// A merge candidate during BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of symbol IDs to merge
    pub pair: Pair,
    /// The weighted frequency of this pair
    pub count: u64,
    /// Order in which the pair was first observed (lower = earlier)
    pub birth: u64,
    /// Version of the pair when this entry was pushed
    version: u64,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, count: u64, birth: u64) -> Self {
        Self {
            pair,
            count,
            birth,
            version: 0,
        }
    }
}

// Higher count first, then the earlier-born pair.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.birth.cmp(&self.birth))
            .then_with(|| self.version.cmp(&other.version))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue for BPE merge operations.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
#[derive(Debug, Default)]
pub struct PairPriorityQueue {
    /// The heap storing merge candidates
    heap: OctonaryHeap<MergeCandidate>,
    /// Current version of every pair that has a live entry
    versions: AHashMap<Pair, u64>,
    /// Monotonic version source
    clock: u64,
}

impl PairPriorityQueue {
    /// Create a new priority queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            versions: AHashMap::with_capacity(capacity),
            clock: 0,
        }
    }

    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a candidate, superseding any earlier entry for the same pair.
    ///
    /// A candidate with a zero count only invalidates earlier entries.
    pub fn push(&mut self, mut candidate: MergeCandidate) {
        self.clock += 1;
        if candidate.count == 0 {
            self.versions.remove(&candidate.pair);
            return;
        }
        candidate.version = self.clock;
        self.versions.insert(candidate.pair, self.clock);
        self.heap.push(candidate);
    }

    /// Record a new count for a pair.
    pub fn update(&mut self, pair: Pair, count: u64, birth: u64) {
        self.push(MergeCandidate::new(pair, count, birth));
    }

    /// Pop the highest priority live candidate.
    ///
    /// Returns None once only stale entries (or nothing) remain.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.versions.get(&candidate.pair) == Some(&candidate.version) {
                self.versions.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Get the number of (potentially stale) entries in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of pairs with a live entry.
    pub fn live(&self) -> usize {
        self.versions.len()
    }
}

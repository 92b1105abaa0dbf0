//! Merge rule management for BPE.
//!
//! Merge rules are stored using symbol IDs rather than strings for fast comparison.
//! Rules are kept twice: as a pair-keyed map for encoding and as a rank-ordered
//! list for persistence and inspection.

use ahash::AHashMap;

/// A pair of symbol IDs that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, new_symbol_id).
///
/// The rank indicates the priority of this merge rule (lower rank = higher priority).
type MergeMap = AHashMap<Pair, (u32, u32)>;

/// A single learned merge: `left + right -> id`, learned on iteration `rank`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergeRule {
    pub left: u32,
    pub right: u32,
    pub id: u32,
    pub rank: u32,
}

impl MergeRule {
    /// The pair this rule rewrites.
    #[inline]
    pub fn pair(&self) -> Pair {
        (self.left, self.right)
    }
}

/// Collection of BPE merge rules with efficient lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Merge rules: pair -> (rank, new_symbol_id)
    merges: MergeMap,
    /// Rules in rank order; `rules[r].rank == r`
    rules: Vec<MergeRule>,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new collection with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            merges: MergeMap::with_capacity(capacity),
            rules: Vec::with_capacity(capacity),
        }
    }

    /// Append the next rule. Its rank is the number of rules already stored.
    ///
    /// Returns `false` (and stores nothing) if the pair already has a rule.
    pub fn push(&mut self, pair: Pair, new_symbol_id: u32) -> bool {
        if self.merges.contains_key(&pair) {
            return false;
        }
        let rank = self.rules.len() as u32;
        self.merges.insert(pair, (rank, new_symbol_id));
        self.rules.push(MergeRule {
            left: pair.0,
            right: pair.1,
            id: new_symbol_id,
            rank,
        });
        true
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns Some((rank, new_symbol_id)) if this pair should be merged,
    /// None otherwise.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, u32)> {
        self.merges.get(&pair).copied()
    }

    /// Rules in rank order.
    #[inline]
    pub fn rules(&self) -> &[MergeRule] {
        &self.rules
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The ordered `(left, right)` pairs, rank 0 first.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.rules.iter().map(MergeRule::pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_dense_ranks() {
        let mut rules = MergeRules::new();
        assert!(rules.push((4, 5), 9));
        assert!(rules.push((5, 6), 10));

        assert_eq!(rules.get((4, 5)), Some((0, 9)));
        assert_eq!(rules.get((5, 6)), Some((1, 10)));
        assert_eq!(rules.get((6, 7)), None);
        assert_eq!(
            rules.rules()[1],
            MergeRule {
                left: 5,
                right: 6,
                id: 10,
                rank: 1
            }
        );
    }

    #[test]
    fn test_duplicate_pair_rejected() {
        let mut rules = MergeRules::new();
        assert!(rules.push((4, 5), 9));
        assert!(!rules.push((4, 5), 10));
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_pairs_in_rank_order() {
        let mut rules = MergeRules::with_capacity(3);
        rules.push((7, 8), 20);
        rules.push((1, 2), 21);
        rules.push((20, 21), 22);

        let pairs: Vec<Pair> = rules.pairs().collect();
        assert_eq!(pairs, vec![(7, 8), (1, 2), (20, 21)]);
    }
}

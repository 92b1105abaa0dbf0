//! Training words and pair frequency bookkeeping.

use ahash::{AHashMap, AHashSet};
use subtok_core::{MergeCandidate, Pair, PairPriorityQueue, WorkerPool};

/// Placeholder for characters outside the alphabet. Never part of a counted pair.
pub const RARE_SYMBOL: u32 = u32::MAX;

/// A unique corpus word as a sequence of symbol ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Word {
    symbols: Vec<u32>,
    count: u64,
}

impl Word {
    pub fn new(symbols: Vec<u32>, count: u64) -> Self {
        Self { symbols, count }
    }

    #[inline]
    pub fn symbols(&self) -> &[u32] {
        &self.symbols
    }

    /// Occurrences of this word in the corpus.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Pairs in this word, left to right.
    ///
    /// In a run of identical symbols pairs do not overlap, so `x x x` yields
    /// `(x, x)` once. Pairs touching [`RARE_SYMBOL`] are skipped.
    pub fn pairs(&self) -> Vec<Pair> {
        let s = &self.symbols;
        let mut pairs = Vec::with_capacity(s.len().saturating_sub(1));
        let mut i = 0;
        while i + 1 < s.len() {
            let (a, b) = (s[i], s[i + 1]);
            if a != RARE_SYMBOL && b != RARE_SYMBOL {
                pairs.push((a, b));
            }
            if a == b && i + 2 < s.len() && s[i + 2] == a {
                i += 2;
            } else {
                i += 1;
            }
        }
        pairs
    }

    /// Replace every non-overlapping occurrence of `pair` with `new_id`.
    ///
    /// Returns the weighted pair frequency changes: pairs present after the
    /// merge with `+count` (in position order), then pairs present before it
    /// with `-count`.
    pub fn merge(&mut self, pair: Pair, new_id: u32) -> Vec<(Pair, i64)> {
        let before = self.pairs();

        let s = &mut self.symbols;
        let n = s.len();
        let (mut read, mut write) = (0, 0);
        while read < n {
            if read + 1 < n && s[read] == pair.0 && s[read + 1] == pair.1 {
                s[write] = new_id;
                read += 2;
            } else {
                s[write] = s[read];
                read += 1;
            }
            write += 1;
        }
        s.truncate(write);

        let weight = self.count as i64;
        let mut changes: Vec<(Pair, i64)> = self.pairs().into_iter().map(|p| (p, weight)).collect();
        changes.extend(before.into_iter().map(|p| (p, -weight)));
        changes
    }
}

#[derive(Debug, Clone, Copy)]
struct PairStat {
    count: u64,
    birth: u64,
}

/// Pair frequencies, the words containing each pair, and the merge queue.
#[derive(Debug, Default)]
pub struct PairStatistics {
    stats: AHashMap<Pair, PairStat>,
    /// pair -> ids of words that (may) contain it
    occurrences: AHashMap<Pair, AHashSet<u32>>,
    queue: PairPriorityQueue,
    next_birth: u64,
}

impl PairStatistics {
    /// Count every pair of every word. Birth stamps follow word order.
    pub fn from_words(words: &[Word], pool: &WorkerPool) -> Self {
        let per_word = pool.map(words, Word::pairs);

        let mut this = Self::default();
        for (word_id, (word, pairs)) in words.iter().zip(per_word).enumerate() {
            for pair in pairs {
                this.observe(pair, word.count as i64);
                this.occurrences
                    .entry(pair)
                    .or_default()
                    .insert(word_id as u32);
            }
        }

        this.queue = PairPriorityQueue::with_capacity(this.stats.len());
        for (&pair, stat) in &this.stats {
            this.queue.update(pair, stat.count, stat.birth);
        }
        this
    }

    fn observe(&mut self, pair: Pair, delta: i64) {
        let next_birth = &mut self.next_birth;
        let stat = self.stats.entry(pair).or_insert_with(|| {
            let birth = *next_birth;
            *next_birth += 1;
            PairStat { count: 0, birth }
        });
        stat.count = (stat.count as i64 + delta).max(0) as u64;
    }

    /// Pop the most frequent pair; ties go to the pair observed first.
    pub fn pop_best(&mut self) -> Option<MergeCandidate> {
        self.queue.pop().filter(|c| c.count > 0)
    }

    /// Current frequency of a pair.
    pub fn count(&self, pair: Pair) -> u64 {
        self.stats.get(&pair).map_or(0, |s| s.count)
    }

    /// Number of distinct pairs with a positive frequency.
    pub fn live_pairs(&self) -> usize {
        self.queue.live()
    }

    /// Remove and return, sorted, the ids of words that may contain `pair`.
    pub fn take_words(&mut self, pair: Pair) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .occurrences
            .remove(&pair)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Apply per-word frequency changes, in word id order.
    pub fn apply<I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = (u32, Vec<(Pair, i64)>)>,
    {
        let mut totals: AHashMap<Pair, i64> = AHashMap::new();
        let mut touched: Vec<Pair> = Vec::new();

        for (word_id, deltas) in changes {
            for (pair, delta) in deltas {
                if delta > 0 {
                    self.occurrences.entry(pair).or_default().insert(word_id);
                    // Assign a birth stamp on first sight
                    self.observe(pair, 0);
                }
                let total = totals.entry(pair).or_insert_with(|| {
                    touched.push(pair);
                    0
                });
                *total += delta;
            }
        }

        for pair in touched {
            let delta = totals[&pair];
            if delta == 0 {
                continue;
            }
            self.observe(pair, delta);
            let stat = self.stats[&pair];
            self.queue.update(pair, stat.count, stat.birth);
        }
    }
}

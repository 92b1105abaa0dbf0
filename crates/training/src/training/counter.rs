//! Corpus reading for BPE training.
//!
//! The corpus is cut into one shard per worker at whitespace, each shard counts
//! its words and characters in parallel, and the shard tables are merged. Words
//! keep the offset of their first occurrence so the merged word list comes out
//! in corpus order whatever the number of shards.

use super::stats::{Word, RARE_SYMBOL};
use ahash::AHashMap;
use std::ops::Range;
use subtok_core::{Result, SpecialTokens, TokenizerError, WorkerPool, WORD_BOUNDARY};

/// Unique words and base alphabet of a corpus.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    /// Base characters in id order, [`WORD_BOUNDARY`] first
    pub alphabet: Vec<char>,
    /// Unique words in order of first occurrence
    pub words: Vec<Word>,
    /// Number of non-whitespace characters read
    pub total_chars: u64,
    /// Characters left out of the alphabet
    pub dropped: Vec<char>,
}

/// Per-shard counts. Words borrow from the corpus text.
#[derive(Debug, Default)]
struct ShardCounts<'a> {
    /// word -> (occurrences, byte offset of first occurrence)
    words: AHashMap<&'a str, (u64, usize)>,
    chars: AHashMap<char, u64>,
}

impl<'a> ShardCounts<'a> {
    fn record(&mut self, word: &'a str, offset: usize) {
        let entry = self.words.entry(word).or_insert((0, offset));
        entry.0 += 1;
        entry.1 = entry.1.min(offset);
    }

    fn absorb(&mut self, other: ShardCounts<'a>) {
        for (word, (count, offset)) in other.words {
            let entry = self.words.entry(word).or_insert((0, offset));
            entry.0 += count;
            entry.1 = entry.1.min(offset);
        }
        for (ch, count) in other.chars {
            *self.chars.entry(ch).or_insert(0) += count;
        }
    }
}

/// Reads a corpus into training words.
#[derive(Debug, Clone, Copy)]
pub struct CorpusReader {
    coverage: f64,
}

impl CorpusReader {
    /// Create a reader keeping characters that cover `coverage` of the corpus.
    pub fn new(coverage: f64) -> Result<Self> {
        if !(coverage > 0.0 && coverage <= 1.0) {
            return Err(TokenizerError::InvalidConfig(format!(
                "coverage must be in (0, 1], got {}",
                coverage
            )));
        }
        Ok(Self { coverage })
    }

    /// Count words and characters of `text` and build the base alphabet.
    pub fn read(&self, text: &str, special: SpecialTokens, pool: &WorkerPool) -> Result<Corpus> {
        let shards = shard_bounds(text, pool.threads().max(1));
        let counts = pool
            .map(&shards, |range| count_shard(text, range.clone()))
            .into_iter()
            .fold(ShardCounts::default(), |mut acc, shard| {
                acc.absorb(shard);
                acc
            });

        if counts.words.is_empty() {
            return Err(TokenizerError::InvalidConfig(
                "corpus contains no words".to_string(),
            ));
        }

        let total_chars: u64 = counts.chars.values().sum();
        let (alphabet, dropped) = self.select_alphabet(&counts.chars, total_chars);
        log::debug!(
            "Alphabet: {} characters kept, {} dropped",
            alphabet.len(),
            dropped.len()
        );

        let mut ids = special.free_ids();
        let index: AHashMap<char, u32> = alphabet.iter().map(|&ch| (ch, ids.next_id())).collect();
        let boundary = index[&WORD_BOUNDARY];

        let mut unique: Vec<(&str, u64, usize)> = counts
            .words
            .into_iter()
            .map(|(word, (count, offset))| (word, count, offset))
            .collect();
        unique.sort_unstable_by_key(|&(_, _, offset)| offset);

        let words = pool.map(&unique, |&(word, count, _)| {
            let mut symbols = Vec::with_capacity(word.len() + 1);
            symbols.push(boundary);
            symbols.extend(
                word.chars()
                    .map(|ch| index.get(&ch).copied().unwrap_or(RARE_SYMBOL)),
            );
            Word::new(symbols, count)
        });

        Ok(Corpus {
            alphabet,
            words,
            total_chars,
            dropped,
        })
    }

    /// Keep the most frequent characters; drop the rarest ones while their
    /// combined count stays within `total * (1 - coverage)`.
    fn select_alphabet(&self, chars: &AHashMap<char, u64>, total: u64) -> (Vec<char>, Vec<char>) {
        let mut ranked: Vec<(char, u64)> = chars
            .iter()
            .filter(|&(&ch, _)| ch != WORD_BOUNDARY)
            .map(|(&ch, &count)| (ch, count))
            .collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let budget = (total as f64 * (1.0 - self.coverage)).floor() as u64;
        let mut dropped_count = 0u64;
        let mut keep = ranked.len();
        while keep > 0 && dropped_count + ranked[keep - 1].1 <= budget {
            dropped_count += ranked[keep - 1].1;
            keep -= 1;
        }

        let mut alphabet = Vec::with_capacity(keep + 1);
        alphabet.push(WORD_BOUNDARY);
        alphabet.extend(ranked[..keep].iter().map(|&(ch, _)| ch));
        let dropped = ranked[keep..].iter().map(|&(ch, _)| ch).collect();
        (alphabet, dropped)
    }
}

/// Split `text` into `shards` byte ranges, each cut moved forward to the next
/// whitespace character so no word straddles two shards.
fn shard_bounds(text: &str, shards: usize) -> Vec<Range<usize>> {
    let mut cuts = Vec::with_capacity(shards + 1);
    cuts.push(0);
    for i in 1..shards {
        let mut cut = (text.len() * i / shards).max(cuts[cuts.len() - 1]);
        while cut < text.len()
            && !(text.is_char_boundary(cut) && text[cut..].starts_with(char::is_whitespace))
        {
            cut += 1;
        }
        cuts.push(cut);
    }
    cuts.push(text.len());
    cuts.windows(2).map(|w| w[0]..w[1]).collect()
}

fn count_shard(text: &str, range: Range<usize>) -> ShardCounts<'_> {
    let mut counts = ShardCounts::default();
    let mut start: Option<usize> = None;

    for (i, ch) in text[range.clone()].char_indices() {
        let pos = range.start + i;
        if ch.is_whitespace() {
            if let Some(s) = start.take() {
                counts.record(&text[s..pos], s);
            }
        } else {
            *counts.chars.entry(ch).or_insert(0) += 1;
            start.get_or_insert(pos);
        }
    }
    if let Some(s) = start {
        counts.record(&text[s..range.end], s);
    }

    counts
}

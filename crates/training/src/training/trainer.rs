//! BPE trainer implementation.
//!
//! Training repeatedly merges the most frequent adjacent pair. The pair choice
//! is sequential; rewriting the words that contain the chosen pair runs on the
//! worker pool.

use super::counter::CorpusReader;
use super::stats::{PairStatistics, Word};
use subtok_core::parallel::resolve_thread_count;
use subtok_core::{
    Pair, Result, SpecialTokens, TokenizerError, Vocabulary, WorkerPool, SPECIAL_COUNT,
};

/// Configuration for BPE training.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Target vocabulary size, specials included
    pub vocab_size: usize,
    /// Fraction of corpus characters the base alphabet must cover
    pub coverage: f64,
    /// Worker threads; -1 uses every hardware thread
    pub threads: i32,
    /// Reserved special ids
    pub special: SpecialTokens,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            vocab_size: 30_000,
            coverage: 1.0,
            threads: -1,
            special: SpecialTokens::default(),
        }
    }
}

impl TrainingConfig {
    /// Check everything that can be checked without reading the corpus.
    pub fn validate(&self) -> Result<()> {
        self.special.validate()?;
        if self.special.max_id() as usize >= self.vocab_size {
            return Err(TokenizerError::InvalidConfig(format!(
                "special id {} does not fit in a vocabulary of size {}",
                self.special.max_id(),
                self.vocab_size
            )));
        }
        CorpusReader::new(self.coverage)?;
        resolve_thread_count(self.threads)?;
        Ok(())
    }
}

/// Summary of a training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingReport {
    pub requested_vocab_size: usize,
    pub vocab_size: usize,
    pub alphabet_size: usize,
    pub merges: usize,
    pub unique_words: usize,
    pub threads: usize,
}

impl TrainingReport {
    /// Whether training reached the requested size.
    pub fn is_complete(&self) -> bool {
        self.vocab_size == self.requested_vocab_size
    }
}

/// Trained vocabulary plus its report.
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    pub vocab: Vocabulary,
    pub report: TrainingReport,
}

/// BPE trainer.
///
/// Trains a BPE vocabulary from text by iteratively merging the most
/// frequent symbol pairs.
#[derive(Debug, Clone, Default)]
pub struct BpeTrainer {
    config: TrainingConfig,
}

impl BpeTrainer {
    /// Create a new BPE trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on `text` using a pool sized from the configuration.
    pub fn train(&self, text: &str) -> Result<TrainingOutput> {
        self.config.validate()?;
        let pool = WorkerPool::from_thread_count(self.config.threads)?;
        self.train_with_pool(text, &pool)
    }

    /// Train on `text` using an existing pool. `config.threads` is ignored.
    pub fn train_with_pool(&self, text: &str, pool: &WorkerPool) -> Result<TrainingOutput> {
        let config = &self.config;
        config.validate()?;
        let special = config.special;

        log::info!(
            "Training BPE: vocab_size={}, coverage={}, threads={}",
            config.vocab_size,
            config.coverage,
            pool.threads()
        );

        let corpus = CorpusReader::new(config.coverage)?.read(text, special, pool)?;
        let alphabet_size = corpus.alphabet.len();
        let base_size = SPECIAL_COUNT + alphabet_size;
        if config.vocab_size < base_size {
            return Err(TokenizerError::InvalidConfig(format!(
                "vocab_size {} is smaller than the {} specials plus {} base symbols",
                config.vocab_size, SPECIAL_COUNT, alphabet_size
            )));
        }
        log::info!(
            "Corpus: {} unique words, {} characters, alphabet of {}",
            corpus.words.len(),
            corpus.total_chars,
            alphabet_size
        );

        let mut words = corpus.words;
        let unique_words = words.len();
        let target_merges = config.vocab_size - base_size;
        let merges = learn_merges(&mut words, special, alphabet_size, target_merges, pool);

        let vocab_size = base_size + merges.len();
        if merges.len() < target_merges {
            log::warn!(
                "Stopped after {} merges: no adjacent pair left to merge \
                 (vocabulary size {} instead of {})",
                merges.len(),
                vocab_size,
                config.vocab_size
            );
            if special.max_id() as usize >= vocab_size {
                return Err(TokenizerError::InvalidConfig(format!(
                    "training stopped at vocabulary size {}, which leaves special id {} unassigned",
                    vocab_size,
                    special.max_id()
                )));
            }
        }

        let vocab = Vocabulary::from_parts(special, &corpus.alphabet, &merges)?;
        log::info!("Training finished: vocabulary size {}", vocab.len());

        Ok(TrainingOutput {
            vocab,
            report: TrainingReport {
                requested_vocab_size: config.vocab_size,
                vocab_size,
                alphabet_size,
                merges: merges.len(),
                unique_words,
                threads: pool.threads(),
            },
        })
    }
}

/// Run up to `target` merge iterations over `words`.
fn learn_merges(
    words: &mut [Word],
    special: SpecialTokens,
    alphabet_size: usize,
    target: usize,
    pool: &WorkerPool,
) -> Vec<Pair> {
    let mut stats = PairStatistics::from_words(words, pool);
    let mut ids = special.free_ids().skipped(alphabet_size);
    let mut merges = Vec::with_capacity(target);
    let progress_every = (target / 10).max(1);

    while merges.len() < target {
        let Some(best) = stats.pop_best() else {
            break;
        };
        let new_id = ids.next_id();
        merges.push(best.pair);

        let word_ids = stats.take_words(best.pair);
        let mut batch: Vec<Word> = word_ids
            .iter()
            .map(|&id| std::mem::take(&mut words[id as usize]))
            .collect();
        let changes = pool.map_mut(&mut batch, |word| word.merge(best.pair, new_id));
        for (&id, word) in word_ids.iter().zip(batch) {
            words[id as usize] = word;
        }
        stats.apply(word_ids.into_iter().zip(changes));

        if merges.len() % progress_every == 0 {
            log::debug!(
                "Merge {}/{}: ({}, {}) -> {} with frequency {}, {} live pairs",
                merges.len(),
                target,
                best.pair.0,
                best.pair.1,
                new_id,
                best.count,
                stats.live_pairs()
            );
        }
    }

    merges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train(text: &str, vocab_size: usize, threads: i32) -> Result<TrainingOutput> {
        BpeTrainer::new(TrainingConfig {
            vocab_size,
            threads,
            ..Default::default()
        })
        .train(text)
    }

    #[test]
    fn test_scenario_merges() {
        let output = train("aaabdaaabac", 12, 1).unwrap();
        let vocab = output.vocab;

        let merges: Vec<Pair> = vocab.merges().pairs().collect();
        assert_eq!(merges, vec![(5, 5), (5, 6), (9, 10)]);
        assert_eq!(vocab.get_token(9), Some("aa"));
        assert_eq!(vocab.get_token(10), Some("ab"));
        assert_eq!(vocab.get_token(11), Some("aaab"));
        assert_eq!(vocab.len(), 12);
        assert!(output.report.is_complete());
    }

    #[test]
    fn test_scenario_continues_in_first_seen_order() {
        let vocab = train("aaabdaaabac", 13, 1).unwrap().vocab;
        assert_eq!(vocab.get_token(12), Some("ac"));
    }

    #[test]
    fn test_early_stop() {
        let output = train("ab", 100, 1).unwrap();

        assert_eq!(output.vocab.len(), 9);
        assert_eq!(output.vocab.get_token(7), Some("▁a"));
        assert_eq!(output.vocab.get_token(8), Some("▁ab"));
        assert_eq!(output.report.requested_vocab_size, 100);
        assert_eq!(output.report.vocab_size, 9);
        assert!(!output.report.is_complete());
    }

    #[test]
    fn test_early_stop_leaving_special_hole() {
        let trainer = BpeTrainer::new(TrainingConfig {
            vocab_size: 100,
            threads: 1,
            special: SpecialTokens {
                pad: 0,
                unk: 1,
                bos: 2,
                eos: 50,
            },
            ..Default::default()
        });
        let err = trainer.train("ab").unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_vocab_too_small() {
        let err = train("abcdef", 6, 1).unwrap_err();
        assert!(matches!(err, TokenizerError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_configs() {
        let bad = [
            TrainingConfig {
                vocab_size: 3,
                ..Default::default()
            },
            TrainingConfig {
                coverage: 0.0,
                ..Default::default()
            },
            TrainingConfig {
                threads: 0,
                ..Default::default()
            },
            TrainingConfig {
                special: SpecialTokens {
                    pad: 0,
                    unk: 0,
                    bos: 1,
                    eos: 2,
                },
                ..Default::default()
            },
        ];
        for config in bad {
            let err = BpeTrainer::new(config.clone()).train("some text").unwrap_err();
            assert!(
                matches!(err, TokenizerError::InvalidConfig(_)),
                "{:?} gave {:?}",
                config,
                err
            );
        }
    }

    #[test]
    fn test_thread_count_invariance() {
        let text = "the quick brown fox jumps over the lazy dog \
                    the dog barks and the fox runs away quickly \
                    brown dogs and quick foxes are the best of friends";

        let reference: Vec<Pair> = train(text, 60, 1).unwrap().vocab.merges().pairs().collect();
        for threads in [2, 8] {
            let merges: Vec<Pair> = train(text, 60, threads)
                .unwrap()
                .vocab
                .merges()
                .pairs()
                .collect();
            assert_eq!(merges, reference, "threads = {}", threads);
        }
    }

    #[test]
    fn test_custom_special_ids() {
        let trainer = BpeTrainer::new(TrainingConfig {
            vocab_size: 12,
            threads: 1,
            special: SpecialTokens {
                pad: 11,
                unk: 10,
                bos: 9,
                eos: 8,
            },
            ..Default::default()
        });
        let vocab = trainer.train("aaabdaaabac").unwrap().vocab;

        assert_eq!(vocab.get_token(0), Some("▁"));
        assert_eq!(vocab.get_token(11), Some("<PAD>"));
        assert_eq!(vocab.get_token(5), Some("aa"));
        assert_eq!(vocab.get_token(7), Some("aaab"));
    }
}

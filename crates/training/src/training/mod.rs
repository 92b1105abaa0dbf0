//! Training infrastructure for BPE tokenizers.
//!
//! This module provides the corpus reader, the pair statistics and the
//! merge loop that learn a vocabulary from text.

pub mod counter;
pub mod stats;
pub mod trainer;

pub use counter::{Corpus, CorpusReader};
pub use stats::{PairStatistics, Word, RARE_SYMBOL};
pub use trainer::{BpeTrainer, TrainingConfig, TrainingOutput, TrainingReport};

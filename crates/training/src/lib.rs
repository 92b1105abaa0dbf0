//! subtok-training - BPE training infrastructure
//!
//! This crate learns BPE merge rules from text and produces an immutable
//! [`subtok_core::Vocabulary`].
//!
//! # Features
//!
//! - Parallel corpus counting with a deterministic word order
//! - Character coverage control for the base alphabet
//! - Lazy-invalidation priority queue with first-seen tie-breaking
//! - Per-iteration word rewriting on a bounded worker pool
//!
//! # Example
//!
//! ```rust
//! use subtok_training::{BpeTrainer, TrainingConfig};
//!
//! let trainer = BpeTrainer::new(TrainingConfig {
//!     vocab_size: 12,
//!     threads: 1,
//!     ..Default::default()
//! });
//! let output = trainer.train("aaabdaaabac").unwrap();
//! assert_eq!(output.vocab.get_token(11), Some("aaab"));
//! ```

pub use subtok_core::{Result, TokenizerError};

// Training infrastructure
pub mod training;
pub use training::{
    BpeTrainer, Corpus, CorpusReader, PairStatistics, TrainingConfig, TrainingOutput,
    TrainingReport, Word,
};

//! subtok-core - Core BPE data structures and inference
//!
//! This crate provides the vocabulary, merge rules, the worker pool, and the
//! encoder/decoder that apply a learned vocabulary to text. Training lives in
//! `subtok-training`; the user-facing facade in `subtok-tokenizer`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use subtok_core::{EncodeOptions, Encoder, OutputType, SpecialTokens, Vocabulary, WORD_BOUNDARY};
//!
//! let vocab = Vocabulary::from_parts(SpecialTokens::default(), &[WORD_BOUNDARY, 'a', 'b'], &[(5, 6)])
//!     .unwrap();
//! let encoder = Encoder::new(Arc::new(vocab));
//! let out = encoder.encode_sentence("ab", OutputType::Id, EncodeOptions::default());
//! assert_eq!(out.as_ids(), Some(&[4, 7][..]));
//! ```

pub mod error;
pub use error::{ErrorKind, Result, TokenizerError};

// Core BPE algorithm modules
pub mod core;
pub use core::{
    MergeCandidate, MergeRule, MergeRules, Pair, PairPriorityQueue, SpecialTokens,
    SymbolIds, Vocabulary, SPECIAL_COUNT, WORD_BOUNDARY,
};

pub mod parallel;
pub use parallel::WorkerPool;

// Inference
pub mod encoding;
pub use encoding::{Decoder, EncodeOptions, EncodedSequence, Encoder, OutputType};

//! subtok-tokenizer - High-level tokenizer API
//!
//! This crate provides a user-facing interface for BPE subword tokenization,
//! integrating training, the vocabulary, the encoder/decoder and model
//! persistence into a single type.
//!
//! # Features
//!
//! - Fluent builder for training configuration
//! - Batch encoding to ids or subwords, with optional bos/eos/reverse
//! - Batch decoding with optional ignored ids
//! - Saving and loading through any `Read`/`Write`
//!
//! # Example
//!
//! ```rust
//! use subtok_tokenizer::{EncodeOptions, Tokenizer};
//!
//! let tokenizer = Tokenizer::builder()
//!     .vocab_size(12)
//!     .threads(1)
//!     .train("aaabdaaabac")?;
//!
//! let ids = tokenizer.encode_as_ids(&["aaab"], EncodeOptions::default());
//! assert_eq!(ids, vec![vec![4, 11]]);
//!
//! let text = tokenizer.decode(&ids)?;
//! assert_eq!(text, vec!["aaab".to_string()]);
//! # Ok::<(), subtok_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use subtok_core::{
    EncodeOptions, EncodedSequence, ErrorKind, OutputType, Result, SpecialTokens, TokenizerError,
    Vocabulary,
};
pub use subtok_training::{TrainingConfig, TrainingReport};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Tokenizer, TokenizerBuilder};

// IO/Serialization
pub mod io;
pub use io::{SerializedModel, TokenizerLoader, TokenizerSaver};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Format definitions for model serialization.
//!
//! A model is a single JSON document: a header, the symbol table in id order
//! and the merge rules in rank order.

use serde::{Deserialize, Serialize};
use subtok_core::SpecialTokens;

/// Version written into every saved model.
pub const FORMAT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Model header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedHeader {
    pub vocab_size: usize,
    pub special: SpecialTokens,
    pub alphabet_size: usize,
}

/// Complete model serialization format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedModel {
    /// Version of the crate that wrote the model
    pub version: String,
    pub header: SerializedHeader,
    /// Symbol text by id, placeholders included
    pub symbols: Vec<String>,
    /// `[left, right]` pairs, rank 0 first
    pub merges: Vec<[u32; 2]>,
}

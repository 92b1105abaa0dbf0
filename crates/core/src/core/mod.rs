//! Core BPE data structures.
//!
//! Symbol tables, merge rules and the training priority queue, shared by
//! training and inference.

pub mod merges;
pub mod priority;
pub mod vocab;

pub use merges::{MergeRule, MergeRules, Pair};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use vocab::{SpecialTokens, SymbolIds, Vocabulary, SPECIAL_COUNT, WORD_BOUNDARY};

//! Mapping ids back to text.

use crate::core::vocab::{Vocabulary, WORD_BOUNDARY};
use crate::error::Result;
use ahash::AHashSet;
use std::sync::Arc;

/// Decoder over a shared vocabulary.
#[derive(Debug, Clone)]
pub struct Decoder {
    vocab: Arc<Vocabulary>,
}

impl Decoder {
    pub fn new(vocab: Arc<Vocabulary>) -> Self {
        Self { vocab }
    }

    /// Decode one id sequence.
    ///
    /// Boundary markers become spaces and one leading space is dropped.
    /// Specials render as their placeholders unless listed in `ignore`.
    pub fn decode(&self, ids: &[u32], ignore: Option<&AHashSet<u32>>) -> Result<String> {
        let mut text = String::with_capacity(ids.len() * 4);
        for &id in ids {
            if ignore.is_some_and(|set| set.contains(&id)) {
                continue;
            }
            let symbol = self.vocab.id_to_subword(id)?;
            text.extend(
                symbol
                    .chars()
                    .map(|c| if c == WORD_BOUNDARY { ' ' } else { c }),
            );
        }
        if text.starts_with(' ') {
            text.remove(0);
        }
        Ok(text)
    }
}

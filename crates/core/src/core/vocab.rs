//! Vocabulary storage and lookup.
//!
//! A [`Vocabulary`] is the immutable result of training or of loading a model.
//! Id lookups index a `Vec` directly; string lookups go through an `AHashMap`.
//! Symbol text is stored as `CompactString`, which keeps short subwords inline.

use crate::core::merges::{MergeRules, Pair};
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Marker prefixed to every word; decodes to a space.
pub const WORD_BOUNDARY: char = '\u{2581}';

/// Placeholder text stored at the padding id.
pub const PAD_TOKEN: &str = "<PAD>";
/// Placeholder text stored at the unknown id.
pub const UNK_TOKEN: &str = "<UNK>";
/// Placeholder text stored at the beginning-of-sequence id.
pub const BOS_TOKEN: &str = "<BOS>";
/// Placeholder text stored at the end-of-sequence id.
pub const EOS_TOKEN: &str = "<EOS>";

/// Number of reserved special ids.
pub const SPECIAL_COUNT: usize = 4;

/// Reserved special token IDs.
///
/// These are used extensively during tokenization, so they live next to the
/// symbol table rather than behind a string lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTokens {
    /// Padding token ID
    pub pad: u32,
    /// Unknown token ID
    pub unk: u32,
    /// Beginning of sequence token ID
    pub bos: u32,
    /// End of sequence token ID
    pub eos: u32,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            pad: 0,
            unk: 1,
            bos: 2,
            eos: 3,
        }
    }
}

impl SpecialTokens {
    /// Check if an ID is a special token.
    #[inline]
    pub fn is_special(&self, id: u32) -> bool {
        id == self.pad || id == self.unk || id == self.bos || id == self.eos
    }

    /// The four ids paired with their placeholder text.
    pub fn entries(&self) -> [(u32, &'static str); SPECIAL_COUNT] {
        [
            (self.pad, PAD_TOKEN),
            (self.unk, UNK_TOKEN),
            (self.bos, BOS_TOKEN),
            (self.eos, EOS_TOKEN),
        ]
    }

    /// Largest of the four ids.
    pub fn max_id(&self) -> u32 {
        self.pad.max(self.unk).max(self.bos).max(self.eos)
    }

    /// Reject configurations where two specials share an id.
    pub fn validate(&self) -> Result<()> {
        let entries = self.entries();
        for (i, (id, name)) in entries.iter().enumerate() {
            if let Some((_, other)) = entries[i + 1..].iter().find(|(o, _)| o == id) {
                return Err(TokenizerError::InvalidConfig(format!(
                    "special tokens {} and {} share id {}",
                    name, other, id
                )));
            }
        }
        Ok(())
    }

    /// Allocator over the ids left free by the specials.
    pub fn free_ids(&self) -> SymbolIds {
        SymbolIds::new(*self)
    }
}

/// Hands out symbol ids in ascending order, skipping the special ids.
#[derive(Debug, Clone)]
pub struct SymbolIds {
    next: u32,
    special: SpecialTokens,
}

impl SymbolIds {
    pub fn new(special: SpecialTokens) -> Self {
        Self { next: 0, special }
    }

    /// Next free id.
    pub fn next_id(&mut self) -> u32 {
        while self.special.is_special(self.next) {
            self.next += 1;
        }
        let id = self.next;
        self.next += 1;
        id
    }

    /// Skip `n` ids, returning the allocator for chaining.
    pub fn skipped(mut self, n: usize) -> Self {
        for _ in 0..n {
            self.next_id();
        }
        self
    }
}

/// Immutable vocabulary: symbol table, base alphabet, merge rules, specials.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// ID -> symbol text
    symbols: Vec<CompactString>,
    /// Symbol text -> lowest ID carrying it
    lookup: AHashMap<CompactString, u32>,
    /// Base character -> ID
    alphabet: AHashMap<char, u32>,
    /// Base characters in ID order
    alphabet_order: Vec<char>,
    /// Learned merges
    merges: MergeRules,
    /// Special token IDs
    special: SpecialTokens,
}

impl Vocabulary {
    /// Assemble a vocabulary from its parts.
    ///
    /// `alphabet` lists the base characters in id order and must contain
    /// [`WORD_BOUNDARY`]. `merges` lists merge pairs in rank order; the result of
    /// merge `r` is the `r`-th free id after the alphabet. Any structural
    /// inconsistency is reported as [`TokenizerError::Format`].
    pub fn from_parts(special: SpecialTokens, alphabet: &[char], merges: &[Pair]) -> Result<Self> {
        special
            .validate()
            .map_err(|e| TokenizerError::Format(e.to_string()))?;

        let size = SPECIAL_COUNT + alphabet.len() + merges.len();
        if special.max_id() as usize >= size {
            return Err(TokenizerError::Format(format!(
                "special id {} is outside a vocabulary of {} symbols",
                special.max_id(),
                size
            )));
        }

        let mut symbols = vec![CompactString::default(); size];
        for (id, text) in special.entries() {
            symbols[id as usize] = CompactString::new(text);
        }

        let mut ids = special.free_ids();
        let mut alphabet_index = AHashMap::with_capacity(alphabet.len());
        for &ch in alphabet {
            let id = ids.next_id();
            if alphabet_index.insert(ch, id).is_some() {
                return Err(TokenizerError::Format(format!(
                    "character {:?} appears twice in the alphabet",
                    ch
                )));
            }
            symbols[id as usize] = CompactString::new(ch.encode_utf8(&mut [0u8; 4]));
        }
        if !alphabet_index.contains_key(&WORD_BOUNDARY) {
            return Err(TokenizerError::Format(
                "alphabet is missing the word boundary marker".to_string(),
            ));
        }

        let mut rules = MergeRules::with_capacity(merges.len());
        for (rank, &(left, right)) in merges.iter().enumerate() {
            let id = ids.next_id();
            for part in [left, right] {
                if part >= id || special.is_special(part) {
                    return Err(TokenizerError::Format(format!(
                        "merge rule {} references undefined symbol {}",
                        rank, part
                    )));
                }
            }
            if !rules.push((left, right), id) {
                return Err(TokenizerError::Format(format!(
                    "merge rule {} repeats pair ({}, {})",
                    rank, left, right
                )));
            }
            let mut text = symbols[left as usize].clone();
            text.push_str(&symbols[right as usize]);
            symbols[id as usize] = text;
        }

        let mut lookup = AHashMap::with_capacity(size);
        for (id, text) in symbols.iter().enumerate() {
            lookup.entry(text.clone()).or_insert(id as u32);
        }

        Ok(Self {
            symbols,
            lookup,
            alphabet: alphabet_index,
            alphabet_order: alphabet.to_vec(),
            merges: rules,
            special,
        })
    }

    /// Get the ID for a symbol string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.lookup.get(token).copied()
    }

    /// Get the symbol string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.symbols.get(id as usize).map(|s| s.as_str())
    }

    /// Like [`get_id`](Self::get_id) but fails with a lookup error.
    pub fn subword_to_id(&self, subword: &str) -> Result<u32> {
        self.get_id(subword)
            .ok_or_else(|| TokenizerError::UnknownToken(subword.to_string()))
    }

    /// Like [`get_token`](Self::get_token) but fails with a lookup error.
    pub fn id_to_subword(&self, id: u32) -> Result<&str> {
        self.get_token(id).ok_or(TokenizerError::UnknownTokenId {
            id,
            vocab_size: self.len(),
        })
    }

    /// ID of a base character, if it is part of the alphabet.
    #[inline]
    pub fn base_id(&self, ch: char) -> Option<u32> {
        self.alphabet.get(&ch).copied()
    }

    /// ID of the word boundary symbol.
    #[inline]
    pub fn boundary_id(&self) -> u32 {
        // from_parts guarantees the boundary is in the alphabet
        self.alphabet[&WORD_BOUNDARY]
    }

    /// Base characters in ID order.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet_order
    }

    /// Learned merge rules.
    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    /// Special token IDs.
    pub fn special(&self) -> SpecialTokens {
        self.special
    }

    /// All symbol strings ordered by ID.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.symbols.iter().map(|s| s.as_str())
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false: a vocabulary holds at least the specials and the boundary.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

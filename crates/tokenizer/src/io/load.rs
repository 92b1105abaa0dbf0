//! Load functionality for saved models.
//!
//! Loading re-derives the vocabulary from its header, alphabet and merge list
//! and then checks that the stored symbol table agrees with it, so a model that
//! was edited by hand or cut short is rejected instead of silently misbehaving.

use super::format::{SerializedModel, FORMAT_VERSION};
use super::save::json_error;
use subtok_core::{Pair, Result, TokenizerError, Vocabulary, SPECIAL_COUNT};
use std::io::{BufReader, Read};

/// Model loader - rebuilds a vocabulary from any byte source.
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Read a model from `reader`.
    pub fn load_from<R: Read>(reader: R) -> Result<Vocabulary> {
        let model: SerializedModel =
            serde_json::from_reader(BufReader::new(reader)).map_err(json_error)?;
        Self::deserialize(model)
    }

    /// Read a model from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Vocabulary> {
        let model: SerializedModel = serde_json::from_slice(bytes).map_err(json_error)?;
        Self::deserialize(model)
    }

    /// Validate a deserialized model and build its vocabulary.
    pub fn deserialize(model: SerializedModel) -> Result<Vocabulary> {
        if model.version != FORMAT_VERSION {
            log::debug!(
                "Loading model written by version {} (current {})",
                model.version,
                FORMAT_VERSION
            );
        }

        let header = &model.header;
        let size = header.vocab_size;
        let derived = SPECIAL_COUNT
            .checked_add(header.alphabet_size)
            .and_then(|n| n.checked_add(model.merges.len()));
        if derived != Some(size) {
            return Err(corrupt(format!(
                "header declares {} symbols but has {} base symbols and {} merges",
                size,
                header.alphabet_size,
                model.merges.len()
            )));
        }
        if model.symbols.len() != size {
            return Err(corrupt(format!(
                "header declares {} symbols but the table holds {}",
                size,
                model.symbols.len()
            )));
        }

        let special = header.special;
        special
            .validate()
            .map_err(|e| TokenizerError::Format(e.to_string()))?;
        if special.max_id() as usize >= size {
            return Err(corrupt(format!(
                "special id {} is outside the vocabulary",
                special.max_id()
            )));
        }
        for (id, placeholder) in special.entries() {
            if model.symbols[id as usize] != placeholder {
                return Err(corrupt(format!(
                    "symbol {} should be {} but is {:?}",
                    id, placeholder, model.symbols[id as usize]
                )));
            }
        }

        let mut ids = special.free_ids();
        let mut alphabet = Vec::with_capacity(header.alphabet_size);
        for _ in 0..header.alphabet_size {
            let id = ids.next_id() as usize;
            let mut chars = model.symbols[id].chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => alphabet.push(ch),
                _ => {
                    return Err(corrupt(format!(
                        "base symbol {} is {:?}, expected a single character",
                        id, model.symbols[id]
                    )))
                }
            }
        }

        let merges: Vec<Pair> = model.merges.iter().map(|&[l, r]| (l, r)).collect();
        let vocab = Vocabulary::from_parts(special, &alphabet, &merges)?;

        if let Some((id, (expected, stored))) = vocab
            .iter()
            .zip(&model.symbols)
            .enumerate()
            .find(|(_, (expected, stored))| expected != stored)
        {
            return Err(corrupt(format!(
                "symbol {} is {:?} but its merge produces {:?}",
                id, stored, expected
            )));
        }

        Ok(vocab)
    }
}

fn corrupt(message: String) -> TokenizerError {
    TokenizerError::Format(message)
}

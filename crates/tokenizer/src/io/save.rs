//! Save functionality for trained models.

use super::format::{SerializedHeader, SerializedModel, FORMAT_VERSION};
use subtok_core::{Result, TokenizerError, Vocabulary};
use std::io::{BufWriter, Write};

/// Model saver - writes a vocabulary to any byte sink.
pub struct TokenizerSaver<'a> {
    vocab: &'a Vocabulary,
}

impl<'a> TokenizerSaver<'a> {
    /// Create a new saver for the given vocabulary.
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self { vocab }
    }

    /// Write the model as JSON.
    pub fn save_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer(&mut writer, &self.serialize()).map_err(json_error)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize the model into a byte buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.serialize()).map_err(json_error)
    }

    /// Serialize the vocabulary to a structure.
    pub fn serialize(&self) -> SerializedModel {
        let vocab = self.vocab;
        SerializedModel {
            version: FORMAT_VERSION.to_string(),
            header: SerializedHeader {
                vocab_size: vocab.len(),
                special: vocab.special(),
                alphabet_size: vocab.alphabet().len(),
            },
            symbols: vocab.iter().map(str::to_string).collect(),
            merges: vocab.merges().pairs().map(|(l, r)| [l, r]).collect(),
        }
    }
}

/// Map a serde_json failure to an I/O or format error.
pub(crate) fn json_error(e: serde_json::Error) -> TokenizerError {
    if e.is_io() {
        TokenizerError::Io(e.into())
    } else {
        TokenizerError::Format(e.to_string())
    }
}

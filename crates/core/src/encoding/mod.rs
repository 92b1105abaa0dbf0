//! Encoding text with learned merges and decoding ids back to text.

pub mod decoder;
pub mod encoder;

pub use decoder::Decoder;
pub use encoder::{EncodeOptions, EncodedSequence, Encoder, OutputType, Piece};

//! Serialization and deserialization for BPE models.
//!
//! Models are read from any `Read` and written to any `Write`; opening files
//! is left to the caller.

pub mod format;
pub mod load;
pub mod save;

pub use format::{SerializedHeader, SerializedModel, FORMAT_VERSION};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;

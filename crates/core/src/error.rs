//! Error types for the subtok tokenizer library.

use thiserror::Error;

/// Main error type for the tokenizer library.
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// Invalid configuration (vocab size, special ids, coverage, output type)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Corrupt or truncated model stream
    #[error("Corrupt model: {0}")]
    Format(String),

    /// Unknown token ID
    #[error("Unknown token ID: {id} (vocabulary size is {vocab_size})")]
    UnknownTokenId { id: u32, vocab_size: usize },

    /// Unknown token string
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// I/O error surfaced from a caller-provided reader or writer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad classification of a [`TokenizerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Format,
    Lookup,
    Io,
}

impl TokenizerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig(_) | Self::ThreadPool(_) => ErrorKind::Configuration,
            Self::Format(_) => ErrorKind::Format,
            Self::UnknownTokenId { .. } | Self::UnknownToken(_) => ErrorKind::Lookup,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type alias for tokenizer operations.
pub type Result<T> = std::result::Result<T, TokenizerError>;

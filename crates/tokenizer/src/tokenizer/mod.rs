//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties together
//! training, the shared vocabulary, the encoder/decoder and the worker pool.

use crate::io::{TokenizerLoader, TokenizerSaver};
use ahash::AHashSet;
use std::io::{Read, Write};
use std::sync::Arc;
use subtok_core::{
    Decoder, EncodeOptions, EncodedSequence, Encoder, OutputType, Result, SpecialTokens,
    Vocabulary, WorkerPool,
};
use subtok_training::{BpeTrainer, TrainingConfig, TrainingReport};

/// Builder for training a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TrainingConfig,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target vocabulary size.
    pub fn vocab_size(mut self, size: usize) -> Self {
        self.config.vocab_size = size;
        self
    }

    /// Set the character coverage of the base alphabet.
    pub fn coverage(mut self, coverage: f64) -> Self {
        self.config.coverage = coverage;
        self
    }

    /// Set the worker thread count (-1 for all hardware threads).
    pub fn threads(mut self, threads: i32) -> Self {
        self.config.threads = threads;
        self
    }

    pub fn pad_id(mut self, id: u32) -> Self {
        self.config.special.pad = id;
        self
    }

    pub fn unk_id(mut self, id: u32) -> Self {
        self.config.special.unk = id;
        self
    }

    pub fn bos_id(mut self, id: u32) -> Self {
        self.config.special.bos = id;
        self
    }

    pub fn eos_id(mut self, id: u32) -> Self {
        self.config.special.eos = id;
        self
    }

    /// Set all special ids at once.
    pub fn special_tokens(mut self, special: SpecialTokens) -> Self {
        self.config.special = special;
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train a tokenizer on `corpus`.
    pub fn train(self, corpus: &str) -> Result<Tokenizer> {
        Tokenizer::train(corpus, self.config)
    }
}

/// Main tokenizer struct.
///
/// Cloning is cheap: the vocabulary and the worker pool are shared.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    vocab: Arc<Vocabulary>,
    encoder: Encoder,
    decoder: Decoder,
    pool: WorkerPool,
}

impl Tokenizer {
    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    fn with_pool(vocab: Vocabulary, pool: WorkerPool) -> Self {
        let vocab = Arc::new(vocab);
        Self {
            encoder: Encoder::new(Arc::clone(&vocab)),
            decoder: Decoder::new(Arc::clone(&vocab)),
            vocab,
            pool,
        }
    }

    /// Train a tokenizer on `corpus`.
    pub fn train(corpus: &str, config: TrainingConfig) -> Result<Self> {
        Self::train_with_report(corpus, config).map(|(tokenizer, _)| tokenizer)
    }

    /// Train a tokenizer and return the training summary alongside it.
    pub fn train_with_report(
        corpus: &str,
        config: TrainingConfig,
    ) -> Result<(Self, TrainingReport)> {
        config.validate()?;
        let pool = WorkerPool::from_thread_count(config.threads)?;
        let output = BpeTrainer::new(config).train_with_pool(corpus, &pool)?;
        Ok((Self::with_pool(output.vocab, pool), output.report))
    }

    /// Load a model from a byte buffer.
    pub fn load(bytes: &[u8], threads: i32) -> Result<Self> {
        let pool = WorkerPool::from_thread_count(threads)?;
        let vocab = TokenizerLoader::from_bytes(bytes)?;
        Ok(Self::with_pool(vocab, pool))
    }

    /// Load a model from a reader.
    pub fn load_from<R: Read>(reader: R, threads: i32) -> Result<Self> {
        let pool = WorkerPool::from_thread_count(threads)?;
        let vocab = TokenizerLoader::load_from(reader)?;
        Ok(Self::with_pool(vocab, pool))
    }

    /// Serialize the model into a byte buffer.
    pub fn save(&self) -> Result<Vec<u8>> {
        TokenizerSaver::new(&self.vocab).to_bytes()
    }

    /// Write the model to a writer.
    pub fn save_to<W: Write>(&self, writer: W) -> Result<()> {
        TokenizerSaver::new(&self.vocab).save_to(writer)
    }

    /// Encode a batch of sentences on the worker pool, preserving order.
    pub fn encode<S>(
        &self,
        sentences: &[S],
        output: OutputType,
        options: EncodeOptions,
    ) -> Vec<EncodedSequence>
    where
        S: AsRef<str> + Sync,
    {
        self.pool.map(sentences, |sentence| {
            self.encoder.encode_sentence(sentence.as_ref(), output, options)
        })
    }

    /// Encode a batch of sentences to ids.
    pub fn encode_as_ids<S>(&self, sentences: &[S], options: EncodeOptions) -> Vec<Vec<u32>>
    where
        S: AsRef<str> + Sync,
    {
        self.pool.map(sentences, |sentence| {
            self.encoder.encode_ids(sentence.as_ref(), options)
        })
    }

    /// Encode a batch of sentences to subword strings.
    pub fn encode_as_subwords<S>(
        &self,
        sentences: &[S],
        options: EncodeOptions,
    ) -> Vec<Vec<String>>
    where
        S: AsRef<str> + Sync,
    {
        self.pool.map(sentences, |sentence| {
            self.encoder.encode_subwords(sentence.as_ref(), options)
        })
    }

    /// Decode a batch of id sequences.
    pub fn decode<S>(&self, sequences: &[S]) -> Result<Vec<String>>
    where
        S: AsRef<[u32]> + Sync,
    {
        self.pool
            .try_map(sequences, |ids| self.decoder.decode(ids.as_ref(), None))
    }

    /// Decode a batch of id sequences, skipping the ids in `ignore`.
    pub fn decode_ignoring<S>(
        &self,
        sequences: &[S],
        ignore: &AHashSet<u32>,
    ) -> Result<Vec<String>>
    where
        S: AsRef<[u32]> + Sync,
    {
        self.pool
            .try_map(sequences, |ids| self.decoder.decode(ids.as_ref(), Some(ignore)))
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// All symbol strings ordered by id.
    pub fn vocab(&self) -> Vec<String> {
        self.vocab.iter().map(str::to_string).collect()
    }

    /// Get a reference to the vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Id of a subword.
    pub fn subword_to_id(&self, subword: &str) -> Result<u32> {
        self.vocab.subword_to_id(subword)
    }

    /// Subword of an id.
    pub fn id_to_subword(&self, id: u32) -> Result<String> {
        self.vocab.id_to_subword(id).map(str::to_string)
    }

    /// Special token ids.
    pub fn special(&self) -> SpecialTokens {
        self.vocab.special()
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.threads()
    }
}

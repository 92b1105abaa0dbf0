//! Train command implementation.

use clap::Parser;

/// Train command arguments.
#[derive(Parser)]
pub struct TrainCommand {
    /// Path to the training corpus
    #[arg(short, long)]
    pub data: String,

    /// Where to write the trained model
    #[arg(short, long)]
    pub model: String,

    /// Target vocabulary size, special tokens included
    #[arg(long, default_value_t = 30_000)]
    pub vocab_size: usize,

    /// Fraction of corpus characters the base alphabet must cover
    #[arg(long, default_value_t = 1.0)]
    pub coverage: f64,

    /// Worker threads (-1 for all)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub n_threads: i32,

    #[arg(long, default_value_t = 0)]
    pub pad_id: u32,

    #[arg(long, default_value_t = 1)]
    pub unk_id: u32,

    #[arg(long, default_value_t = 2)]
    pub bos_id: u32,

    #[arg(long, default_value_t = 3)]
    pub eos_id: u32,
}

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::time::Instant;
use subtok_tokenizer::Tokenizer;

pub fn run(cmd: TrainCommand) -> Result<()> {
    let start = Instant::now();
    let corpus =
        fs::read_to_string(&cmd.data).with_context(|| format!("failed to read {}", cmd.data))?;
    log::info!(
        "Read {} bytes from {} in {:.2}s",
        corpus.len(),
        cmd.data,
        start.elapsed().as_secs_f64()
    );

    let builder = Tokenizer::builder()
        .vocab_size(cmd.vocab_size)
        .coverage(cmd.coverage)
        .threads(cmd.n_threads)
        .pad_id(cmd.pad_id)
        .unk_id(cmd.unk_id)
        .bos_id(cmd.bos_id)
        .eos_id(cmd.eos_id);

    let start = Instant::now();
    let (tokenizer, report) = Tokenizer::train_with_report(&corpus, builder.config().clone())?;
    log::info!(
        "Trained {} merges over {} unique words in {:.2}s",
        report.merges,
        report.unique_words,
        start.elapsed().as_secs_f64()
    );

    let file =
        File::create(&cmd.model).with_context(|| format!("failed to create {}", cmd.model))?;
    tokenizer.save_to(file)?;

    println!(
        "Saved model with {} symbols ({} base, {} merges) to {}",
        report.vocab_size, report.alphabet_size, report.merges, cmd.model
    );
    if !report.is_complete() {
        println!(
            "Requested {} symbols; the corpus supported only {}",
            report.requested_vocab_size, report.vocab_size
        );
    }

    Ok(())
}

//! Vocab command implementation.

use clap::Parser;

/// Vocab command arguments.
#[derive(Parser)]
pub struct VocabCommand {
    /// Path to the trained model
    #[arg(short, long)]
    pub model: String,

    /// Print the id next to each subword
    #[arg(long, default_value_t = false)]
    pub ids: bool,
}

use super::load_model;
use anyhow::Result;
use std::io::{self, BufWriter, Write};

pub fn run(cmd: VocabCommand) -> Result<()> {
    let tokenizer = load_model(&cmd.model, 1)?;

    let mut out = BufWriter::new(io::stdout().lock());
    for (id, subword) in tokenizer.vocab().iter().enumerate() {
        if cmd.ids {
            writeln!(out, "{}\t{}", id, subword)?;
        } else {
            writeln!(out, "{}", subword)?;
        }
    }
    out.flush()?;

    Ok(())
}

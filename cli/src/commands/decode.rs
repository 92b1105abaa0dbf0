//! Decode command implementation.

use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the trained model
    #[arg(short, long)]
    pub model: String,

    /// Input file, one space-separated id sequence per line (stdin if omitted or "-")
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Ids to leave out of the decoded text
    #[arg(long, value_delimiter = ',')]
    pub ignore_ids: Vec<u32>,

    /// Worker threads (-1 for all)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub n_threads: i32,
}

use super::{load_model, output, read_lines};
use ahash::AHashSet;
use anyhow::{Context, Result};
use std::io::Write;

pub fn run(cmd: DecodeCommand) -> Result<()> {
    let tokenizer = load_model(&cmd.model, cmd.n_threads)?;

    let sequences = read_lines(cmd.input.as_deref())?
        .iter()
        .enumerate()
        .map(|(n, line)| {
            line.split_whitespace()
                .map(|id| id.parse::<u32>())
                .collect::<Result<Vec<u32>, _>>()
                .with_context(|| format!("line {}: expected space-separated ids", n + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let decoded = if cmd.ignore_ids.is_empty() {
        tokenizer.decode(&sequences)?
    } else {
        let ignore: AHashSet<u32> = cmd.ignore_ids.iter().copied().collect();
        tokenizer.decode_ignoring(&sequences, &ignore)?
    };

    let mut out = output(cmd.output.as_deref())?;
    for text in decoded {
        writeln!(out, "{}", text)?;
    }
    out.flush()?;

    Ok(())
}

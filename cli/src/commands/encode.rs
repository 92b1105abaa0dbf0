//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the trained model
    #[arg(short, long)]
    pub model: String,

    /// Input file, one sentence per line (stdin if omitted or "-")
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output type: "id" or "subword"
    #[arg(long, default_value = "id")]
    pub output_type: String,

    /// Prepend the beginning-of-sequence id
    #[arg(long, default_value_t = false)]
    pub bos: bool,

    /// Append the end-of-sequence id
    #[arg(long, default_value_t = false)]
    pub eos: bool,

    /// Reverse each encoded sequence
    #[arg(long, default_value_t = false)]
    pub reverse: bool,

    /// Worker threads (-1 for all)
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    pub n_threads: i32,
}

use super::{load_model, output, read_lines};
use anyhow::Result;
use std::io::Write;
use subtok_tokenizer::{EncodeOptions, EncodedSequence, OutputType};

pub fn run(cmd: EncodeCommand) -> Result<()> {
    let output_type: OutputType = cmd.output_type.parse()?;
    let tokenizer = load_model(&cmd.model, cmd.n_threads)?;
    let sentences = read_lines(cmd.input.as_deref())?;

    let options = EncodeOptions {
        bos: cmd.bos,
        eos: cmd.eos,
        reverse: cmd.reverse,
    };
    let encoded = tokenizer.encode(&sentences, output_type, options);
    log::debug!("Encoded {} sentences", encoded.len());

    let mut out = output(cmd.output.as_deref())?;
    for sequence in encoded {
        let line = match sequence {
            EncodedSequence::Ids(ids) => ids
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(" "),
            EncodedSequence::Subwords(pieces) => pieces.join(" "),
        };
        writeln!(out, "{}", line)?;
    }
    out.flush()?;

    Ok(())
}

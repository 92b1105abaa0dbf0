//! CLI commands for the subtok tokenizer.

pub mod decode;
pub mod encode;
pub mod train;
pub mod vocab;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use train::TrainCommand;
pub use vocab::VocabCommand;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use subtok_tokenizer::Tokenizer;

/// Load a model file with a pool of `threads` workers.
pub fn load_model(path: &str, threads: i32) -> Result<Tokenizer> {
    let file = File::open(path).with_context(|| format!("failed to open model {}", path))?;
    Tokenizer::load_from(file, threads).with_context(|| format!("failed to load model {}", path))
}

/// Lines of `path`, or of stdin when `path` is absent or "-".
pub fn read_lines(path: Option<&str>) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = match path {
        None | Some("-") => Box::new(BufReader::new(io::stdin())),
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path))?,
        )),
    };
    reader
        .lines()
        .collect::<io::Result<Vec<_>>>()
        .context("failed to read input")
}

/// Buffered writer to `path`, or to stdout when `path` is absent.
pub fn output(path: Option<&str>) -> Result<Box<dyn Write>> {
    Ok(match path {
        None => Box::new(BufWriter::new(io::stdout())),
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path))?,
        )),
    })
}

//! subtok CLI - Command-line interface for the BPE tokenizer.
//!
//! This is the main entry point for the `subtok` command-line tool. It only
//! handles files and arguments; all tokenization happens in the library.

mod commands;

use clap::{Parser, Subcommand};
use commands::{DecodeCommand, EncodeCommand, TrainCommand, VocabCommand};
use env_logger::Env;
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "subtok")]
#[command(about = "A multi-threaded BPE subword tokenizer", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new model from a text corpus
    Train(TrainCommand),
    /// Encode sentences (one per line) to ids or subwords
    Encode(EncodeCommand),
    /// Decode id sequences (one per line) back to text
    Decode(DecodeCommand),
    /// Print the vocabulary of a model
    Vocab(VocabCommand),
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    builder.filter_level(level);
    let _ = builder.try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Train(cmd) => commands::train::run(cmd)?,
        Commands::Encode(cmd) => commands::encode::run(cmd)?,
        Commands::Decode(cmd) => commands::decode::run(cmd)?,
        Commands::Vocab(cmd) => commands::vocab::run(cmd)?,
    }

    Ok(())
}

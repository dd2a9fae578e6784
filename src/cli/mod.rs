//! `repo2txt` binary entry: argument parsing, log setup and subcommand dispatch.
//!
//! `tree` prints the selection tree of a directory, git ref or GitHub URL;
//! `export` writes the selected files as prompt text or a ZIP archive.

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod export;
mod tree;
mod utils;

/// Select files from a repository and export them as one prompt-ready text
#[derive(Parser)]
#[command(name = "repo2txt", author, version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the repository tree with selection state and token counts
    Tree(tree::TreeArgs),

    /// Export the selected files as a text file or ZIP archive
    Export(export::ExportArgs),
}

fn log_directive(verbose: u8) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    format!("warn,repo2txt={level}")
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_directive(verbose)));
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false).compact();
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::registry().with(layer).with(filter).try_init();
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Tree(args) => tree::run(args),
        Commands::Export(args) => export::run(args),
    }
}

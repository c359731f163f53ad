//! obfustree - copy a directory tree with names and data replaced by numbers
//!
//! Usage:
//!   obfustree InputDir OutputDir        - Copy InputDir into OutputDir
//!   obfustree -vvv InputDir OutputDir   - Also log every attribute

use anyhow::Context;
use clap::Parser;
use obfustree::{
    error::EXIT_USAGE,
    prelude::{Config, Error, Obfuscator, Verbosity},
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "obfustree")]
#[command(version)]
#[command(about = "Copy a directory tree, replacing names, attribute values and contents with sequence numbers")]
#[command(long_about = "Copy a directory tree to a new one where file and directory names, \
attribute values and file contents are replaced by sequential numbers, mostly leading zeroes, \
so every value keeps its original length. Attribute names are kept. Because the numbers are \
sequential, a listing of the copy is in the same order as the original. The result compresses \
well and is suitable for reproducing filesystem bugs without sharing private data.")]
struct Cli {
    /// Directory tree to copy
    input_dir: PathBuf,

    /// Where to create the obfuscated copy (created if missing)
    output_dir: PathBuf,

    /// Log progress: -v directories, -vv files, -vvv attributes,
    /// -vvvv data previews, -vvvvv full data dumps
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let usage_error = e.use_stderr();
            let _ = e.print();
            std::process::exit(if usage_error { EXIT_USAGE } else { 0 });
        }
    };

    // RUST_LOG overrides the level picked from -v
    let default_level = if cli.verbose > 0 { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("obfustree: unable to set up logging: {}", e);
    }

    if let Err(e) = run(&cli) {
        error!("{}", describe(&e));
        std::process::exit(exit_code(&e));
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration from {:?}", path))?,
        None => Config::from_env()?,
    };

    let verbosity = Verbosity::from_count(cli.verbose);
    let mut obfuscator = Obfuscator::new(config).with_verbosity(verbosity);

    obfuscator.obfuscate_tree(&cli.input_dir, &cli.output_dir)?;

    let stats = obfuscator.stats();
    info!(
        "Done: {} directories, {} files, {} attributes, {} bytes written",
        stats.directories, stats.files, stats.attributes, stats.bytes_written
    );
    if stats.skipped_symlinks + stats.skipped_other > 0 {
        info!(
            "Skipped {} symbolic links and {} special files",
            stats.skipped_symlinks, stats.skipped_other
        );
    }
    if stats.truncated > 0 {
        info!("{} values were truncated to the size cap", stats.truncated);
    }

    Ok(())
}

/// Error chain, followed by the OS error code in hex and decimal when there is one
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<Error>().and_then(Error::raw_os_error) {
        Some(code) => format!("{:#}, error code ${:X}/{}", err, code, code),
        None => format!("{:#}", err),
    }
}

/// Pick the exit status for a failed run
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(e) => e.exit_code(),
        None => 1,
    }
}

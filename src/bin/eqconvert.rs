//! eqconvert - CLI tool for converting EQ Bank CSV exports to OFX.

use clap::Parser;
use eqconvert::{
    batch::BatchConverter,
    conversion::OfxConverter,
    locator::{default_search_dir, expand_home, find_csv_files},
    OfxVersion, Result,
};
use std::io::{self, stderr, Write};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "eqconvert")]
#[command(about = "Convert EQ Bank CSV files to OFX format", long_about = None)]
struct Cli {
    /// Directory to search for CSV files (defaults to the Downloads folder)
    #[arg(conflicts_with = "dir")]
    directory: Option<PathBuf>,

    /// Directory to search for CSV files
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Keep CSV files after conversion (by default, CSV files are deleted)
    #[arg(long)]
    keep: bool,

    /// OFX version to write (102, 220)
    #[arg(long = "ofx-version", default_value = "102")]
    ofx_version: String,

    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(level: &str) {
    // stdout carries the conversion report
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(terminal_log).init();
}

fn run(cli: Cli) -> Result<()> {
    let version = cli.ofx_version.parse::<OfxVersion>()?;

    let directory = match cli.directory.or(cli.dir) {
        Some(dir) => expand_home(&dir),
        None => default_search_dir()?,
    };
    tracing::debug!("Searching {}", directory.display());

    let matching_files = find_csv_files(&directory)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if matching_files.is_empty() {
        writeln!(
            out,
            "No matching EQ Bank transaction files found in {}",
            directory.display()
        )?;
        return Ok(());
    }

    writeln!(
        out,
        "Found {} EQ Bank transaction files in {}:",
        matching_files.len(),
        directory.display()
    )?;
    for file_path in &matching_files {
        writeln!(out, "  {}", file_path.display())?;
    }

    writeln!(out, "\nStarting conversion...")?;
    let batch = BatchConverter::new(OfxConverter::new(version), cli.keep);
    batch.run(&matching_files, &mut out)?;

    Ok(())
}

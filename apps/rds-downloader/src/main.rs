//! # rds-downloader
//!
//! Keeps a local copy of reference data identifiers up to date.
//!
//! On every tick the downloader asks the reference data service for the
//! identifiers of each configured enum type, writes them into one JSON
//! envelope, and atomically replaces the published file. Consumers can read
//! the file at any time and always get a complete document.
//!
//! - `rds-downloader run` — download on a fixed interval until Ctrl-C (default)
//! - `rds-downloader once` — run one cycle; exits non-zero unless it succeeded
//! - `rds-downloader show` — summarize the currently published file

mod client;
mod commands;
mod config;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use config::{DownloaderConfig, DEFAULT_CONFIG_FILE};

/// Reference data downloader.
#[derive(Parser)]
#[command(name = "rds-downloader", version, about)]
struct Cli {
    /// Config file (defaults to ./rds-downloader.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log line format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Download on the configured interval until Ctrl-C.
    Run,
    /// Run a single download cycle.
    Once,
    /// Show the currently published data.
    Show,
}

fn init_tracing(format: LogFormat) -> Result<()> {
    // Logs go to stderr so `show` and `once` output stays clean on stdout.
    let filter = EnvFilter::from_default_env()
        .add_directive("rds_downloader=info".parse()?)
        .add_directive("rds_lifecycle=info".parse()?)
        .add_directive("rds_persister=info".parse()?)
        .add_directive("rds_fetcher=info".parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let config = match &cli.config {
        Some(path) => DownloaderConfig::load(path)?,
        None => DownloaderConfig::load_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::execute(&config).await,
        Commands::Once => commands::once::execute(&config).await,
        Commands::Show => commands::show::execute(&config),
    }
}

//! Catalog-Sync main entry point
//!
//! This is the command-line interface for the catalog synchronizer.

use anyhow::Context;
use catalog_sync::config::{load_config_with_hash, validate, Config};
use catalog_sync::output::{CatalogWriter, JsonFileWriter, StdoutWriter};
use catalog_sync::sync::run_sync;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Sync: keeps the tools/certificates catalog in step with its source page
///
/// Fetches the source page, classifies its links, picks the best link per
/// tool, verifies reachability, and writes the catalog as JSON. The previous
/// document is only replaced when the whole run succeeds.
#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(version)]
#[command(about = "Synchronize the tools/certificates catalog", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the output document path
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Override the source page URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Print the document to stdout instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    let writer: Box<dyn CatalogWriter> = if cli.dry_run {
        Box::new(StdoutWriter::new(config.output.pretty))
    } else {
        Box::new(JsonFileWriter::new(&config.output.path, config.output.pretty))
    };

    match run_sync(&config, writer.as_ref()).await {
        Ok(_) => {
            tracing::info!("Synchronization completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Synchronization failed: {}", e);
            Err(e).context("catalog synchronization failed")
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout is reserved for `--dry-run` output.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_sync=info,warn"),
            1 => EnvFilter::new("catalog_sync=debug,info"),
            2 => EnvFilter::new("catalog_sync=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if let Some(output) = &cli.output {
        config.output.path = output.to_string_lossy().into_owned();
    }
    if let Some(base_url) = &cli.base_url {
        config.source.base_url = base_url.clone();
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

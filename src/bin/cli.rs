//! Contact Harvester CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use clap::Parser;
use harvester::{
    config::{self, Overrides},
    error::Result,
    models::OutputLocale,
    pipeline::{self, HarvestRequest},
};

/// Harvester - profile contact extraction through an authenticated browser
#[derive(Parser, Debug)]
#[command(
    name = "harvester",
    version,
    about = "Extract contact details from profile and people-listing pages"
)]
struct Cli {
    /// Profile or collection URLs
    urls: Vec<String>,

    /// Newline-delimited URL file ('#' starts a comment)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file; a .csv extension selects tabular output
    #[arg(short, long, default_value = "contacts.json")]
    output: PathBuf,

    /// Path to a TOML config file (default: ./harvester.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-navigation timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Maximum profiles taken from each collection (0 = no cap)
    #[arg(long)]
    limit: Option<usize>,

    /// Header language for CSV output
    #[arg(long, value_enum)]
    locale: Option<OutputLocale>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = Overrides {
        navigation_timeout_secs: cli.timeout,
        headed: cli.headed,
        collection_cap: cli.limit,
        locale: cli.locale,
    };
    let (config, credential) = config::load_all(cli.config.as_deref(), &overrides)?;

    let inputs = pipeline::collect_inputs(&cli.urls, cli.input.as_deref()).await?;
    let request = HarvestRequest {
        inputs,
        output: cli.output,
    };

    if let Err(e) = pipeline::run_harvest(&config, &credential, &request).await {
        log::error!("{}", e);
        return Err(e);
    }

    log::info!("Done!");

    Ok(())
}

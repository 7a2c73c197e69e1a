//! Tournament discovery CLI.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use soccer_scrapers::config::AppConfig;
use soccer_scrapers::discovery::store::SupabaseStore;
use soccer_scrapers::discovery::{DiscoveryRunner, DiscoverySummary};
use soccer_scrapers::logging;

#[derive(Parser)]
#[command(name = "discover")]
#[command(about = "Discover tournaments and age-group schedule URLs, upserting them into the remote store")]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Max listing pages to crawl
    #[arg(long, default_value = "10")]
    pages: u32,

    /// Override the configured target states
    #[arg(long, num_args = 1..)]
    states: Option<Vec<String>>,

    /// Only process the configured known tournaments
    #[arg(long)]
    known_only: bool,

    /// Persist raw fetched HTML into the output directory
    #[arg(long)]
    debug: bool,

    /// Output directory (debug HTML only)
    #[arg(long, default_value = "./data")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("fatal: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Returns `Ok(true)` when at least one tournament was saved.
async fn run(cli: Cli) -> Result<bool> {
    let config = AppConfig::load(&cli.config)?;
    let _guard = logging::init_logging("logs", "discover", &config.log_level);

    // Missing credentials are the one fatal condition in this tool
    let (url, key) = config.supabase.credentials()?;
    let store = SupabaseStore::new(&url, &key)?;

    let mut discovery_config = config.discovery;
    if let Some(states) = cli.states {
        discovery_config.target_states = states;
    }

    let debug_dir = if cli.debug {
        std::fs::create_dir_all(&cli.output_dir)?;
        Some(cli.output_dir.clone())
    } else {
        None
    };

    let runner = DiscoveryRunner::new(discovery_config, store, debug_dir)?;

    let mut total = DiscoverySummary::default();
    if !cli.known_only {
        let summary = runner.run(cli.pages).await;
        total.tournaments_saved += summary.tournaments_saved;
        total.groups_saved += summary.groups_saved;
    }
    let known = runner.process_known().await;
    total.tournaments_saved += known.tournaments_saved;
    total.groups_saved += known.groups_saved;

    tracing::info!(
        "Run total: {} tournaments, {} scrape targets",
        total.tournaments_saved,
        total.groups_saved
    );
    Ok(total.tournaments_saved > 0)
}

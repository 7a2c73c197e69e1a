//! Standings scraper CLI.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use soccer_scrapers::config::AppConfig;
use soccer_scrapers::logging;
use soccer_scrapers::standings::StandingsScraper;
use soccer_scrapers::standings::output::{OutputWriter, log_summary};

#[derive(Parser)]
#[command(name = "standings")]
#[command(about = "Scrape team standings from archive pages and the live CGI endpoint")]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Scrape all historical seasons (20+ years)
    #[arg(long)]
    all: bool,

    /// Number of years to scrape
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=4))]
    years: u32,

    /// Scrape the current season only, via the live CGI endpoint
    #[arg(long)]
    live: bool,

    /// Scrape one specific season (e.g. 2024_fall)
    #[arg(long)]
    season: Option<String>,

    /// Restrict archive scraping to one division
    #[arg(long, value_parser = ["boys_prem", "girls_prem", "boys_rec", "girls_rec"])]
    division: Option<String>,

    /// Use the CGI endpoint even for archived seasons
    #[arg(long)]
    force_live: bool,

    /// Persist raw fetched HTML into the output directory
    #[arg(long)]
    debug: bool,

    /// Output directory
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

/// Returns `Ok(true)` when at least one record was collected.
async fn run(cli: Cli) -> Result<bool> {
    let config = AppConfig::load(&cli.config)?;
    let _guard = logging::init_logging("logs", "standings", &config.log_level);

    std::fs::create_dir_all(&cli.output_dir)?;
    let debug_dir = cli.debug.then(|| cli.output_dir.clone());

    let mut scraper = StandingsScraper::new(config.standings, debug_dir)?;
    if let Some(division) = &cli.division {
        scraper = scraper.with_division(division);
    }

    if cli.live {
        // Current season only
        let Some(season) = scraper.config().current_seasons.first().cloned() else {
            anyhow::bail!("No current season configured");
        };
        scraper.scrape_live_season(&season).await;
    } else if cli.all {
        scraper.scrape_all_seasons(cli.force_live).await;
    } else if let Some(season) = &cli.season {
        scraper.scrape_season(season, cli.force_live).await;
    } else {
        scraper.scrape_years(cli.years, cli.force_live).await;
    }

    let records = scraper.records().to_vec();
    if records.is_empty() {
        tracing::warn!("No teams found");
        return Ok(false);
    }

    let writer = OutputWriter::new(&cli.output_dir)?;
    writer.write_csv(&records);
    writer.write_records(&records)?;
    writer.write_ingest_files(&records, scraper.config())?;

    log_summary(&records);
    Ok(true)
}

//! Standings scrape orchestration.
//!
//! One fetch completes (including its fixed sleep) before the next
//! begins; there is deliberately no parallelism here.

use anyhow::Result;
use std::path::PathBuf;

use super::live::{
    LiveParser, PREMIER_AGE_GROUPS, PREMIER_SUBDIVISION_COUNT, RECREATIONAL_AGE_GROUPS,
    RECREATIONAL_SUBDIVISIONS, is_error_page,
};
use super::parser::ArchiveParser;
use super::types::{ALL_SEASONS, DIVISIONS, TeamStanding, seasons_for_years};
use crate::config::StandingsConfig;
use crate::fetch::PageFetcher;

pub struct StandingsScraper {
    config: StandingsConfig,
    fetcher: PageFetcher,
    archive: ArchiveParser,
    live: LiveParser,
    /// Archive divisions to visit per season.
    divisions: Vec<String>,
    /// All records accumulated across pages in this run.
    records: Vec<TeamStanding>,
    /// When set, every fetched page's raw HTML is persisted here.
    debug_dir: Option<PathBuf>,
}

impl StandingsScraper {
    pub fn new(config: StandingsConfig, debug_dir: Option<PathBuf>) -> Result<Self> {
        let fetcher = PageFetcher::new(config.request_delay_ms, 1, Some(&config.referer()))?;
        Ok(Self {
            config,
            fetcher,
            archive: ArchiveParser::new()?,
            live: LiveParser::new()?,
            divisions: DIVISIONS.iter().map(|d| d.to_string()).collect(),
            records: Vec::new(),
            debug_dir,
        })
    }

    /// Restrict archive scraping to a single division tag.
    pub fn with_division(mut self, division: &str) -> Self {
        self.divisions = vec![division.to_string()];
        self
    }

    pub fn records(&self) -> &[TeamStanding] {
        &self.records
    }

    pub fn config(&self) -> &StandingsConfig {
        &self.config
    }

    async fn dump_debug(&self, name: &str, html: &str) {
        if let Some(dir) = &self.debug_dir {
            let path = dir.join(name);
            if let Err(e) = tokio::fs::write(&path, html).await {
                tracing::warn!("Failed to write debug HTML {}: {}", path.display(), e);
            }
        }
    }

    /// Scrape one static archive page. Any failure yields no records.
    pub async fn scrape_archive_page(&mut self, season: &str, division: &str) -> Vec<TeamStanding> {
        let url = self.config.archive_url(season, division);
        tracing::info!("Scraping archive: {}", url);

        let Some(html) = self.fetcher.get_page(&url, &[]).await else {
            tracing::debug!("No archive data for {}/{}", season, division);
            return Vec::new();
        };

        self.dump_debug(&format!("debug_archive_{}_{}.html", season, division), &html)
            .await;

        let teams = self.archive.parse(&html, season, division);
        tracing::info!("Found {} teams in {}/{}", teams.len(), season, division);
        teams
    }

    /// Scrape the configured divisions of a season from the archives.
    pub async fn scrape_archive_season(&mut self, season: &str) -> Vec<TeamStanding> {
        let mut season_teams = Vec::new();
        for division in self.divisions.clone() {
            let teams = self.scrape_archive_page(season, &division).await;
            season_teams.extend(teams.iter().cloned());
            self.records.extend(teams);
        }
        season_teams
    }

    /// Scrape one form combination from the CGI endpoint.
    async fn scrape_live_subdivision(
        &mut self,
        gender: &str,
        level: &str,
        age: &str,
        subdivision: &str,
        season: &str,
    ) -> Vec<TeamStanding> {
        let url = self.config.cgi_url();
        let query = [
            ("level", level),
            ("sex", gender),
            ("age", age),
            ("subdivision", subdivision),
        ];

        let Some(html) = self.fetcher.get_page(&url, &query).await else {
            return Vec::new();
        };

        if is_error_page(&html) {
            return Vec::new();
        }

        self.dump_debug(
            &format!("debug_cgi_{}_{}_{}_{}.html", gender, level, age, subdivision)
                .replace('/', "_"),
            &html,
        )
        .await;

        self.live.parse(&html, season, gender, level, age, subdivision)
    }

    /// Sweep every age-group/subdivision combination for one gender and
    /// level.
    pub async fn scrape_live_division(
        &mut self,
        gender: &str,
        level: &str,
        season: &str,
    ) -> Vec<TeamStanding> {
        let (age_groups, subdivisions): (&[&str], Vec<String>) = if level == "Premier" {
            (
                PREMIER_AGE_GROUPS,
                (1..=PREMIER_SUBDIVISION_COUNT).map(|n| n.to_string()).collect(),
            )
        } else {
            (
                RECREATIONAL_AGE_GROUPS,
                RECREATIONAL_SUBDIVISIONS.iter().map(|s| s.to_string()).collect(),
            )
        };

        tracing::info!(
            "Scraping {} {}: {} ages x {} subdivisions = {} requests",
            gender,
            level,
            age_groups.len(),
            subdivisions.len(),
            age_groups.len() * subdivisions.len()
        );

        let mut teams = Vec::new();
        for age in age_groups {
            for subdivision in &subdivisions {
                let found = self
                    .scrape_live_subdivision(gender, level, age, subdivision, season)
                    .await;
                if !found.is_empty() {
                    tracing::debug!("  {} subdiv {}: {} teams", age, subdivision, found.len());
                    teams.extend(found);
                }
            }
        }

        tracing::info!("  Found {} teams in {} {}", teams.len(), gender, level);
        teams
    }

    /// Scrape the full live season: both genders, both levels.
    pub async fn scrape_live_season(&mut self, season: &str) -> Vec<TeamStanding> {
        tracing::info!("Scraping live data for {} via CGI...", season);

        let mut season_teams = Vec::new();
        for (gender, level) in [
            ("Boys", "Premier"),
            ("Girls", "Premier"),
            ("Boys", "Recreational"),
            ("Girls", "Recreational"),
        ] {
            let teams = self.scrape_live_division(gender, level, season).await;
            season_teams.extend(teams.iter().cloned());
            self.records.extend(teams);
        }

        tracing::info!(
            "Live scrape complete: {} total teams for {}",
            season_teams.len(),
            season
        );
        season_teams
    }

    /// Scrape a season, choosing archive vs. live automatically: current
    /// or forced-live seasons go straight to the CGI endpoint; otherwise
    /// the archive is tried first with the CGI path as fallback when it
    /// yields nothing.
    pub async fn scrape_season(&mut self, season: &str, force_live: bool) -> Vec<TeamStanding> {
        if force_live || self.config.is_current_season(season) {
            tracing::info!("Using live CGI for {}", season);
            return self.scrape_live_season(season).await;
        }

        tracing::info!("Using archive for {}", season);
        let teams = self.scrape_archive_season(season).await;
        if teams.is_empty() {
            tracing::info!("Archive empty, trying CGI for {}", season);
            return self.scrape_live_season(season).await;
        }
        teams
    }

    /// Scrape every season in the site's catalogue.
    pub async fn scrape_all_seasons(&mut self, force_live: bool) -> usize {
        tracing::info!("Scraping all {} historical seasons...", ALL_SEASONS.len());
        for season in ALL_SEASONS {
            self.scrape_season(season, force_live).await;
        }
        tracing::info!("Total teams scraped: {}", self.records.len());
        self.records.len()
    }

    /// Scrape the last `years` academic years.
    pub async fn scrape_years(&mut self, years: u32, force_live: bool) -> usize {
        let Some(fall_year) = self.config.current_fall_year() else {
            tracing::error!("No current fall season configured, cannot build season window");
            return 0;
        };

        let seasons = seasons_for_years(years, fall_year);
        tracing::info!("Scraping {} years: {:?}", years, seasons);

        for season in &seasons {
            self.scrape_season(season, force_live).await;
        }

        tracing::info!("Total teams scraped: {}", self.records.len());
        self.records.len()
    }
}

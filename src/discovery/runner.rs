//! Discovery run orchestration.
//!
//! Strictly sequential: listing pages, then one schedule page per
//! tournament, each fetch separated by the configured delay.

use anyhow::Result;
use chrono::Datelike;
use std::collections::HashSet;
use std::path::PathBuf;

use super::parser::DiscoveryParser;
use super::store::SupabaseStore;
use super::types::{GroupTarget, Tournament};
use crate::config::DiscoveryConfig;
use crate::fetch::PageFetcher;

#[derive(Debug, Default)]
pub struct DiscoverySummary {
    pub tournaments_saved: usize,
    pub groups_saved: usize,
}

pub struct DiscoveryRunner {
    config: DiscoveryConfig,
    fetcher: PageFetcher,
    parser: DiscoveryParser,
    store: SupabaseStore,
    debug_dir: Option<PathBuf>,
}

impl DiscoveryRunner {
    pub fn new(
        config: DiscoveryConfig,
        store: SupabaseStore,
        debug_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let fetcher = PageFetcher::new(config.request_delay_ms, config.max_retries, None)?;
        Ok(Self {
            config,
            fetcher,
            parser: DiscoveryParser::new()?,
            store,
            debug_dir,
        })
    }

    async fn dump_debug(&self, name: &str, html: &str) {
        if let Some(dir) = &self.debug_dir {
            let path = dir.join(name);
            if let Err(e) = tokio::fs::write(&path, html).await {
                tracing::warn!("Failed to write debug HTML {}: {}", path.display(), e);
            }
        }
    }

    /// Paginate the tournament listing until a page yields no new event
    /// ids or a page fails to fetch.
    ///
    /// The terminal condition assumes identifier discovery is strictly
    /// monotonic across pages; a listing that re-orders between requests
    /// could end the crawl early. Documented behavior, kept as is.
    pub async fn discover_tournaments(&self, max_pages: u32) -> Vec<Tournament> {
        let mut tournaments = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for page in 1..=max_pages {
            let url = self.config.tournaments_url(page);
            tracing::info!("Fetching tournaments page {}...", page);

            let Some(html) = self.fetcher.get_page(&url, &[]).await else {
                tracing::error!("Failed to fetch page {}", page);
                break;
            };
            self.dump_debug(&format!("debug_tournaments_page_{}.html", page), &html)
                .await;

            let new = self
                .parser
                .parse_listing(&html, &self.config.target_states, &mut seen);
            tracing::info!("  Found {} new tournaments on page {}", new.len(), page);

            if new.is_empty() && page > 1 {
                tracing::info!("No new tournaments on page {}, stopping", page);
                break;
            }
            tournaments.extend(new);
        }

        tracing::info!("Discovered {} tournaments total", tournaments.len());
        tournaments
    }

    /// Drill into one tournament's schedule page for its group URLs.
    pub async fn discover_groups(&self, event_id: &str) -> Vec<GroupTarget> {
        let url = self.config.schedules_url(event_id);
        tracing::info!("  Discovering groups for event {}...", event_id);

        let Some(html) = self.fetcher.get_page(&url, &[]).await else {
            tracing::error!("  Failed to fetch event {}", event_id);
            return Vec::new();
        };
        self.dump_debug(&format!("debug_event_{}_schedules.html", event_id), &html)
            .await;

        let current_year = chrono::Utc::now().year();
        let groups = self
            .parser
            .parse_groups(&html, event_id, &self.config, current_year);
        tracing::info!("    Found {} groups", groups.len());
        groups
    }

    /// Save one tournament and all of its groups to the store.
    async fn process_tournament(
        &self,
        tournament: &Tournament,
        summary: &mut DiscoverySummary,
    ) {
        let Some(tournament_id) = self.store.save_tournament(tournament).await else {
            return;
        };
        summary.tournaments_saved += 1;

        let groups = self.discover_groups(&tournament.event_id).await;
        for group in &groups {
            if self
                .store
                .save_scrape_target(&tournament_id, group, tournament.state.as_deref())
                .await
            {
                summary.groups_saved += 1;
            }
        }
    }

    /// Full discovery: crawl the listing, filter to target states
    /// (keeping unknown-state tournaments), then save each tournament
    /// and its groups.
    pub async fn run(&self, max_pages: u32) -> DiscoverySummary {
        tracing::info!(
            "Tournament discovery, target states: {}",
            self.config.target_states.join(", ")
        );

        let tournaments = self.discover_tournaments(max_pages).await;
        let relevant: Vec<&Tournament> = tournaments
            .iter()
            .filter(|t| {
                t.state
                    .as_ref()
                    .is_none_or(|s| self.config.target_states.contains(s))
            })
            .collect();

        tracing::info!("Processing {} relevant tournaments...", relevant.len());

        let mut summary = DiscoverySummary::default();
        for (i, tournament) in relevant.iter().enumerate() {
            tracing::info!("[{}/{}] {}", i + 1, relevant.len(), tournament.name);
            self.process_tournament(tournament, &mut summary).await;
        }

        tracing::info!(
            "Discovery complete: {} tournaments, {} scrape targets saved",
            summary.tournaments_saved,
            summary.groups_saved
        );
        summary
    }

    /// Process the configured known tournaments that may not appear in
    /// the paginated listing.
    pub async fn process_known(&self) -> DiscoverySummary {
        let known: Vec<Tournament> = self
            .config
            .known_tournaments
            .iter()
            .map(Tournament::from)
            .collect();

        if known.is_empty() {
            return DiscoverySummary::default();
        }

        tracing::info!("Adding {} known tournaments...", known.len());
        let mut summary = DiscoverySummary::default();
        for tournament in &known {
            self.process_tournament(tournament, &mut summary).await;
        }
        summary
    }
}

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::discovery::types::KnownTournament;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub standings: StandingsConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub supabase: SupabaseConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            standings: StandingsConfig::default(),
            discovery: DiscoveryConfig::default(),
            supabase: SupabaseConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a toml file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

/// Settings for the standings scraper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsConfig {
    #[serde(default = "default_standings_base_url")]
    pub base_url: String,

    #[serde(default = "default_archives_path")]
    pub archives_path: String,

    #[serde(default = "default_cgi_path")]
    pub cgi_path: String,

    /// Seasons that are still live (not yet archived). Externalized so the
    /// tool does not embed a fixed date assumption.
    #[serde(default = "default_current_seasons")]
    pub current_seasons: Vec<String>,

    #[serde(default = "default_standings_delay_ms")]
    pub request_delay_ms: u64,
}

fn default_standings_base_url() -> String {
    "https://www.heartlandsoccer.net".to_string()
}

fn default_archives_path() -> String {
    "/reports/seasoninfo/archives/standings".to_string()
}

fn default_cgi_path() -> String {
    "/reports/cgi-jrb/subdiv_standings.cgi".to_string()
}

fn default_current_seasons() -> Vec<String> {
    vec!["2025_fall".to_string(), "2026_spring".to_string()]
}

fn default_standings_delay_ms() -> u64 {
    500
}

impl Default for StandingsConfig {
    fn default() -> Self {
        Self {
            base_url: default_standings_base_url(),
            archives_path: default_archives_path(),
            cgi_path: default_cgi_path(),
            current_seasons: default_current_seasons(),
            request_delay_ms: default_standings_delay_ms(),
        }
    }
}

impl StandingsConfig {
    pub fn is_current_season(&self, season: &str) -> bool {
        self.current_seasons.iter().any(|s| s == season)
    }

    /// Year of the current fall season, used to anchor the rolling
    /// N-year scrape window.
    pub fn current_fall_year(&self) -> Option<i32> {
        self.current_seasons
            .iter()
            .find_map(|s| s.strip_suffix("_fall").and_then(|y| y.parse().ok()))
    }

    pub fn archive_url(&self, season: &str, division: &str) -> String {
        format!(
            "{}{}/{}/{}.html",
            self.base_url, self.archives_path, season, division
        )
    }

    pub fn cgi_url(&self) -> String {
        format!("{}{}", self.base_url, self.cgi_path)
    }

    pub fn referer(&self) -> String {
        format!("{}/league/score-standings/", self.base_url)
    }
}

/// Settings for the tournament discoverer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_discovery_base_url")]
    pub base_url: String,

    #[serde(default = "default_discovery_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Major youth soccer states; tournaments outside this list (with a
    /// recognized state) are skipped.
    #[serde(default = "default_target_states")]
    pub target_states: Vec<String>,

    /// Major tournaments that may not appear in the paginated listing.
    #[serde(default)]
    pub known_tournaments: Vec<KnownTournament>,
}

fn default_discovery_base_url() -> String {
    "https://system.gotsport.com".to_string()
}

fn default_discovery_delay_ms() -> u64 {
    2000
}

fn default_max_retries() -> u32 {
    3
}

fn default_target_states() -> Vec<String> {
    [
        "TX", "CA", "FL", "VA", "GA", "NC", "PA", "NY", "NJ", "MD", "IL", "OH", "CO", "AZ", "WA",
        "MO", "KS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            base_url: default_discovery_base_url(),
            request_delay_ms: default_discovery_delay_ms(),
            max_retries: default_max_retries(),
            target_states: default_target_states(),
            known_tournaments: Vec::new(),
        }
    }
}

impl DiscoveryConfig {
    pub fn tournaments_url(&self, page: u32) -> String {
        format!("{}/tournaments?page={}", self.base_url, page)
    }

    pub fn schedules_url(&self, event_id: &str) -> String {
        format!("{}/org_event/events/{}/schedules", self.base_url, event_id)
    }

    pub fn group_url(&self, event_id: &str, group_id: &str) -> String {
        format!(
            "{}/org_event/events/{}/schedules?group={}",
            self.base_url, event_id, group_id
        )
    }
}

/// Supabase REST credentials. Environment variables take precedence over
/// the config file so deployments can keep the key out of version control.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub service_role_key: String,
}

impl SupabaseConfig {
    /// Resolve credentials, aborting when either is missing. The
    /// discoverer cannot do anything useful without the remote store.
    pub fn credentials(&self) -> Result<(String, String)> {
        let url = std::env::var("SUPABASE_URL").unwrap_or_else(|_| self.url.clone());
        let key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .unwrap_or_else(|_| self.service_role_key.clone());

        if url.is_empty() || key.is_empty() {
            anyhow::bail!("Missing SUPABASE_URL or SUPABASE_SERVICE_ROLE_KEY");
        }
        Ok((url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.standings.request_delay_ms, 500);
        assert_eq!(config.discovery.max_retries, 3);
        assert!(config.discovery.target_states.contains(&"KS".to_string()));
    }

    #[test]
    fn test_current_season() {
        let config = StandingsConfig::default();
        assert!(config.is_current_season("2025_fall"));
        assert!(config.is_current_season("2026_spring"));
        assert!(!config.is_current_season("2024_fall"));
        assert_eq!(config.current_fall_year(), Some(2025));
    }

    #[test]
    fn test_urls() {
        let config = StandingsConfig::default();
        assert_eq!(
            config.archive_url("2024_fall", "boys_prem"),
            "https://www.heartlandsoccer.net/reports/seasoninfo/archives/standings/2024_fall/boys_prem.html"
        );

        let discovery = DiscoveryConfig::default();
        assert_eq!(
            discovery.group_url("43745", "12"),
            "https://system.gotsport.com/org_event/events/43745/schedules?group=12"
        );
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
            log_level = "debug"

            [standings]
            current_seasons = ["2026_fall"]
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.standings.current_seasons, vec!["2026_fall"]);
        // Unspecified fields keep their defaults
        assert_eq!(config.standings.request_delay_ms, 500);
    }
}

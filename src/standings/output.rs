//! Output projections of the accumulated record list.
//!
//! Three independent flatteners: the verbatim record list (CSV + JSON),
//! a deduplicated team-per-season view, and a denormalized standings
//! view, the latter two shaped for database ingestion.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::types::{TeamStanding, season_code};
use crate::config::StandingsConfig;

/// Fixed attribution applied to every ingested row.
const SOURCE_NAME: &str = "heartland_soccer";
const SOURCE_STATE: &str = "KS";
const INITIAL_ELO_RATING: u32 = 1500;

/// One unique (team, season) entry for the teams table.
#[derive(Debug, Clone, Serialize)]
pub struct TeamSeasonRecord {
    pub team_name: String,
    pub state: String,
    pub gender: String,
    pub age_group: String,
    pub season_code: String,
    pub source_name: String,
    pub elo_rating: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub matches_played: u32,
}

/// One flattened standings row with its constructed source URL.
#[derive(Debug, Clone, Serialize)]
pub struct StandingsRecord {
    pub team_name: String,
    pub season: String,
    pub season_code: String,
    pub division: String,
    pub subdivision: String,
    pub age_group: String,
    pub gender: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    pub source: String,
    pub source_url: String,
}

/// Deduplicate records by (name, gender, age group, season code),
/// keeping the entry with the most matches played. Records are never
/// merged; a later record with more matches replaces the earlier one
/// wholesale. Input order is preserved.
pub fn dedup_team_seasons(records: &[TeamStanding]) -> Vec<TeamSeasonRecord> {
    let mut index: HashMap<(String, String, String, String), usize> = HashMap::new();
    let mut out: Vec<TeamSeasonRecord> = Vec::new();

    for team in records {
        let code = season_code(&team.season);
        let key = (
            team.team_name.clone(),
            team.gender.clone(),
            team.age_group.clone(),
            code.clone(),
        );

        let entry = TeamSeasonRecord {
            team_name: team.team_name.clone(),
            state: SOURCE_STATE.to_string(),
            gender: team.gender.clone(),
            age_group: team.age_group.clone(),
            season_code: code,
            source_name: SOURCE_NAME.to_string(),
            elo_rating: INITIAL_ELO_RATING,
            wins: team.wins,
            losses: team.losses,
            draws: team.ties,
            matches_played: team.matches_played(),
        };

        match index.get(&key) {
            Some(&i) => {
                if entry.matches_played > out[i].matches_played {
                    out[i] = entry;
                }
            }
            None => {
                index.insert(key, out.len());
                out.push(entry);
            }
        }
    }

    out
}

/// Flatten every record with its academic-year code and archive URL.
pub fn flatten_standings(records: &[TeamStanding], config: &StandingsConfig) -> Vec<StandingsRecord> {
    records
        .iter()
        .map(|t| StandingsRecord {
            team_name: t.team_name.clone(),
            season: t.season.clone(),
            season_code: season_code(&t.season),
            division: t.division.clone(),
            subdivision: t.subdivision.clone(),
            age_group: t.age_group.clone(),
            gender: t.gender.clone(),
            wins: t.wins,
            losses: t.losses,
            ties: t.ties,
            goals_for: t.goals_for,
            goals_against: t.goals_against,
            points: t.points,
            source: SOURCE_NAME.to_string(),
            source_url: config.archive_url(&t.season, &t.division),
        })
        .collect()
}

/// Writes all output files into one directory, named with a date tag.
pub struct OutputWriter {
    out_dir: PathBuf,
    date_tag: String,
}

impl OutputWriter {
    pub fn new(out_dir: impl AsRef<Path>) -> Result<Self> {
        let out_dir = out_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create output dir: {}", out_dir.display()))?;
        Ok(Self {
            out_dir,
            date_tag: Local::now().format("%Y_%m_%d").to_string(),
        })
    }

    fn path(&self, stem: &str, ext: &str) -> PathBuf {
        self.out_dir.join(format!("{}_{}.{}", stem, self.date_tag, ext))
    }

    /// CSV dump of the raw record list. A failure here is logged and
    /// skipped; the JSON outputs still carry the full data.
    pub fn write_csv(&self, records: &[TeamStanding]) -> Option<PathBuf> {
        let path = self.path("standings", "csv");
        let result = (|| -> Result<()> {
            let mut writer = csv::Writer::from_path(&path)?;
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
            Ok(())
        })();

        match result {
            Ok(()) => {
                tracing::info!("Saved CSV: {}", path.display());
                Some(path)
            }
            Err(e) => {
                tracing::warn!("CSV export failed, skipping: {}", e);
                None
            }
        }
    }

    fn write_json<T: Serialize>(&self, stem: &str, data: &T) -> Result<PathBuf> {
        let path = self.path(stem, "json");
        let json = serde_json::to_string_pretty(data).context("Failed to serialize JSON")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Saved JSON: {}", path.display());
        Ok(path)
    }

    /// Verbatim record list as JSON.
    pub fn write_records(&self, records: &[TeamStanding]) -> Result<PathBuf> {
        self.write_json("standings", &records)
    }

    /// Both ingestion shapes: unique team-seasons and flattened standings.
    pub fn write_ingest_files(
        &self,
        records: &[TeamStanding],
        config: &StandingsConfig,
    ) -> Result<(PathBuf, PathBuf)> {
        let teams = dedup_team_seasons(records);
        tracing::info!("{} unique team-seasons", teams.len());
        let teams_path = self.write_json("supabase_teams", &teams)?;

        let standings = flatten_standings(records, config);
        let standings_path = self.write_json("supabase_standings", &standings)?;

        Ok((teams_path, standings_path))
    }
}

/// Log a per-season-code summary of the scrape, newest first.
pub fn log_summary(records: &[TeamStanding]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for team in records {
        *counts.entry(season_code(&team.season)).or_default() += 1;
    }
    let mut codes: Vec<_> = counts.keys().cloned().collect();
    codes.sort();
    codes.reverse();

    tracing::info!("Total team-season records: {}", records.len());
    for code in codes {
        tracing::info!("  {}: {} teams", code, counts[&code]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(name: &str, season: &str, wins: u32, losses: u32, ties: u32) -> TeamStanding {
        TeamStanding {
            team_number: String::new(),
            team_name: name.to_string(),
            wins,
            losses,
            ties,
            goals_for: 0,
            goals_against: 0,
            red_cards: 0,
            points: wins * 3 + ties,
            season: season.to_string(),
            division: "boys_prem".to_string(),
            age_group: "U12".to_string(),
            subdivision: "U12 Premier Subdivision 1".to_string(),
            gender: "Boys".to_string(),
        }
    }

    #[test]
    fn test_dedup_keeps_most_matches() {
        // Same team seen in archive (partial season) and live (full season)
        let records = vec![
            standing("FC Dallas", "2024_fall", 3, 1, 0),
            standing("FC Dallas", "2024_fall", 6, 2, 1),
        ];
        let teams = dedup_team_seasons(&records);
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].matches_played, 9);
        assert_eq!(teams[0].wins, 6);
        assert_eq!(teams[0].draws, 1);
    }

    #[test]
    fn test_dedup_keeps_earlier_on_tie_or_fewer() {
        let records = vec![
            standing("FC Dallas", "2024_fall", 6, 2, 1),
            standing("FC Dallas", "2024_fall", 3, 1, 0),
        ];
        let teams = dedup_team_seasons(&records);
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].matches_played, 9);
    }

    #[test]
    fn test_dedup_key_includes_season_code() {
        // Fall and the following spring share an academic-year code, so
        // the same team collapses across the two season identifiers...
        let records = vec![
            standing("FC Dallas", "2024_fall", 3, 1, 0),
            standing("FC Dallas", "2025_spring", 5, 2, 0),
        ];
        assert_eq!(dedup_team_seasons(&records).len(), 1);

        // ...but distinct academic years stay separate.
        let records = vec![
            standing("FC Dallas", "2023_fall", 3, 1, 0),
            standing("FC Dallas", "2024_fall", 5, 2, 0),
        ];
        assert_eq!(dedup_team_seasons(&records).len(), 2);
    }

    #[test]
    fn test_team_season_constants() {
        let teams = dedup_team_seasons(&[standing("FC Dallas", "2024_fall", 1, 0, 0)]);
        assert_eq!(teams[0].state, "KS");
        assert_eq!(teams[0].source_name, "heartland_soccer");
        assert_eq!(teams[0].elo_rating, 1500);
        assert_eq!(teams[0].season_code, "2024-25");
    }

    #[test]
    fn test_flatten_standings_source_url() {
        let config = StandingsConfig::default();
        let rows = flatten_standings(&[standing("FC Dallas", "2024_fall", 1, 0, 0)], &config);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].source_url,
            "https://www.heartlandsoccer.net/reports/seasoninfo/archives/standings/2024_fall/boys_prem.html"
        );
        assert_eq!(rows[0].season_code, "2024-25");
        assert_eq!(rows[0].source, "heartland_soccer");
    }
}

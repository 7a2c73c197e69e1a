//! Standings record types and season helpers.

use serde::{Deserialize, Serialize};

/// One team's record in one (season, division) standings table.
///
/// Built during page parsing and immutable afterwards; deduplication for
/// output rebuilds a keyed view instead of mutating records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStanding {
    /// Short alphanumeric roster code, empty when the site omits it
    pub team_number: String,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub red_cards: u32,
    pub points: u32,
    /// Season identifier, e.g. "2024_fall"
    pub season: String,
    /// Division tag, e.g. "boys_prem"
    pub division: String,
    /// "U12" style label, or "Unknown"
    pub age_group: String,
    /// Free-text subdivision heading
    pub subdivision: String,
    /// "Boys", "Girls" or "Unknown"
    pub gender: String,
}

impl TeamStanding {
    pub fn matches_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

/// Seasons that actually exist on the website. Requests outside this
/// catalogue would only spend rate-limited fetches on 404s.
pub const ALL_SEASONS: &[&str] = &[
    "2025_fall",
    "2024_fall",
    "2023_fall",
    "2022_fall",
    "2021_fall",
    "2020_fall",
    "2019_fall",
    "2018_fall",
    "2017_fall",
    "2016_fall",
    "2015_fall",
    "2014_fall",
    "2013_fall",
    "2012_fall",
    "2011_fall",
    "2010_fall",
    "2009_fall",
    "2008_fall",
    "2007_fall",
    "2006_fall",
    "2005_fall",
    "2004_fall",
    "2003_fall",
    "2002_fall",
    "2026_spring",
    "2025_spring",
    "2024_spring",
    "2023_spring",
    "2022_spring",
    "2021_spring",
    "2019_spring",
    "2018_spring",
    "2017_spring",
    "2016_spring",
    "2015_spring",
    "2014_spring",
    "2013_spring",
    "2012_spring",
    "2011_spring",
    "2010_spring",
    "2009_spring",
    "2008_spring",
    "2007_spring",
    "2005_spring",
    "2004_spring",
    "2003_spring",
];

pub const DIVISIONS: &[&str] = &["boys_prem", "girls_prem", "boys_rec", "girls_rec"];

/// Convert a season identifier to its academic-year code.
///
/// Fall season N belongs to academic year "N-(N+1)"; spring season N
/// closes out academic year "(N-1)-N". The two-digit suffix is
/// zero-padded. Malformed identifiers are returned verbatim.
///
/// `"2024_fall"` → `"2024-25"`; `"2025_spring"` → `"2024-25"`.
pub fn season_code(season: &str) -> String {
    let parts: Vec<&str> = season.split('_').collect();
    if parts.len() != 2 {
        return season.to_string();
    }
    let Ok(year) = parts[0].parse::<i32>() else {
        return season.to_string();
    };
    if parts[1] == "fall" {
        format!("{}-{:02}", year, (year + 1) % 100)
    } else {
        format!("{}-{:02}", year - 1, year % 100)
    }
}

/// Seasons covering the last `years` academic years (fall + the
/// following spring per year, capped at 4), newest first, filtered to
/// seasons that exist on the site.
pub fn seasons_for_years(years: u32, current_fall_year: i32) -> Vec<String> {
    let mut seasons = Vec::new();
    for k in 0..years.min(4) {
        let fall_year = current_fall_year - k as i32;
        for season in [
            format!("{}_fall", fall_year),
            format!("{}_spring", fall_year + 1),
        ] {
            if ALL_SEASONS.contains(&season.as_str()) {
                seasons.push(season);
            }
        }
    }
    seasons
}

/// Infer gender from a division tag or label.
pub fn parse_gender(division: &str) -> &'static str {
    if division.starts_with("boys") || division.contains("Boys") {
        "Boys"
    } else if division.starts_with("girls") || division.contains("Girls") {
        "Girls"
    } else {
        "Unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_code_fall() {
        assert_eq!(season_code("2024_fall"), "2024-25");
        assert_eq!(season_code("2025_fall"), "2025-26");
        // Zero-padded two-digit suffix
        assert_eq!(season_code("2008_fall"), "2008-09");
        assert_eq!(season_code("1999_fall"), "1999-00");
    }

    #[test]
    fn test_season_code_spring() {
        assert_eq!(season_code("2025_spring"), "2024-25");
        assert_eq!(season_code("2009_spring"), "2008-09");
    }

    #[test]
    fn test_season_code_malformed() {
        assert_eq!(season_code("2024"), "2024");
        assert_eq!(season_code("2024_fall_extra"), "2024_fall_extra");
        assert_eq!(season_code("abcd_fall"), "abcd_fall");
    }

    #[test]
    fn test_seasons_for_years() {
        assert_eq!(
            seasons_for_years(2, 2025),
            vec!["2025_fall", "2026_spring", "2024_fall", "2025_spring"]
        );
        // 2020_spring does not exist on the site and is filtered out
        let seasons = seasons_for_years(7, 2025);
        assert!(!seasons.contains(&"2020_spring".to_string()));
        // Window is capped at 4 years
        assert!(!seasons.contains(&"2021_fall".to_string()));
    }

    #[test]
    fn test_parse_gender() {
        assert_eq!(parse_gender("boys_prem"), "Boys");
        assert_eq!(parse_gender("girls_rec"), "Girls");
        assert_eq!(parse_gender("coed"), "Unknown");
    }

    #[test]
    fn test_matches_played() {
        let team = TeamStanding {
            team_number: "A123".to_string(),
            team_name: "FC Dallas".to_string(),
            wins: 5,
            losses: 2,
            ties: 1,
            goals_for: 20,
            goals_against: 8,
            red_cards: 0,
            points: 16,
            season: "2024_fall".to_string(),
            division: "boys_prem".to_string(),
            age_group: "U12".to_string(),
            subdivision: "U12 Premier Subdivision 1".to_string(),
            gender: "Boys".to_string(),
        };
        assert_eq!(team.matches_played(), 8);
    }
}

//! Live (CGI form endpoint) standings parser.
//!
//! The current season has no archive page; standings come back one
//! (gender, level, age, subdivision) combination at a time from a legacy
//! CGI form. Responses are either an HTML fragment with standings tables
//! or an error page.

use anyhow::{Context, Result};
use regex::Regex;
use scraper::{Html, Selector};

use super::parser::{element_text, normalize_whitespace, parse_count};
use super::types::TeamStanding;

/// Premier play is organized by straight age groups.
pub const PREMIER_AGE_GROUPS: &[&str] = &[
    "U-9", "U-10", "U-11", "U-12", "U-13", "U-14", "U-15", "U-16", "U-17", "U-18", "U-19",
];

/// Premier subdivisions are numbered 1-14.
pub const PREMIER_SUBDIVISION_COUNT: u32 = 14;

/// Recreational age groups carry grade/format qualifiers in the form value.
pub const RECREATIONAL_AGE_GROUPS: &[&str] = &[
    "U-9/3rd Grade 7v7",
    "U-9/10-3rd/4th Grade 9v9",
    "U-10/4th Grade 7v7",
    "U-10/4th Grade 9v9",
    "U-11/5th Grade 9v9",
    "U-12/6th Grade 9v9",
    "U-13/7th Grade",
    "U-14/8th Grade",
    "U-14/15-8th/9th Grade",
];

pub const RECREATIONAL_SUBDIVISIONS: &[&str] = &["CANADA", "MEXICO", "USA", "1", "2", "3"];

/// Minimum cell count for a live data row (team + W/L/T/GF/GA).
const MIN_LIVE_CELLS: usize = 6;

/// First-cell substrings that mark a header row.
const LIVE_HEADER_TOKENS: &[&str] = &["team", "win", "lose", "tie", "#", "subdivision"];

/// Shortest plausible team name on the live pages.
const MIN_TEAM_NAME_LEN: usize = 3;

/// The CGI endpoint answers unmatched combinations with an error page
/// rather than a non-2xx status.
pub fn is_error_page(html: &str) -> bool {
    let lower = html.to_lowercase();
    if lower.contains("could not match this combination") {
        return true;
    }
    let head_end = lower
        .char_indices()
        .nth(500)
        .map(|(i, _)| i)
        .unwrap_or(lower.len());
    lower[..head_end].contains("error")
}

/// Division tag for a (gender, level) pair, e.g. ("Boys", "Premier") →
/// "boys_prem".
pub fn division_tag(gender: &str, level: &str) -> String {
    let g = if gender == "Boys" { "boys" } else { "girls" };
    let l = if level == "Premier" { "prem" } else { "rec" };
    format!("{}_{}", g, l)
}

pub struct LiveParser {
    table_sel: Selector,
    row_sel: Selector,
    cell_sel: Selector,
    age_re: Regex,
    team_cell_re: Regex,
}

impl LiveParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            table_sel: Selector::parse("table")
                .map_err(|e| anyhow::anyhow!("selector error: {}", e))?,
            row_sel: Selector::parse("tr").map_err(|e| anyhow::anyhow!("selector error: {}", e))?,
            cell_sel: Selector::parse("td, th")
                .map_err(|e| anyhow::anyhow!("selector error: {}", e))?,
            age_re: Regex::new(r"(?i)U-?(\d+)").context("Failed to compile age regex")?,
            team_cell_re: Regex::new(r"^([0-9A-Za-z]{4})\s+(.+)$")
                .context("Failed to compile team cell regex")?,
        })
    }

    /// Parse a CGI standings response for one form combination.
    pub fn parse(
        &self,
        html: &str,
        season: &str,
        gender: &str,
        level: &str,
        age: &str,
        subdivision: &str,
    ) -> Vec<TeamStanding> {
        let document = Html::parse_document(html);

        let division = division_tag(gender, level);
        let age_group = match self.age_re.captures(age) {
            Some(caps) => format!("U{}", &caps[1]),
            None => "Unknown".to_string(),
        };
        let subdivision_name = format!("{} {} {} Subdivision {}", age, gender, level, subdivision);

        let mut teams = Vec::new();

        for table in document.select(&self.table_sel) {
            for tr in table.select(&self.row_sel) {
                let cells: Vec<String> = tr.select(&self.cell_sel).map(element_text).collect();
                if cells.len() < MIN_LIVE_CELLS {
                    continue;
                }

                let first = cells[0].to_lowercase();
                if LIVE_HEADER_TOKENS.iter().any(|t| first.contains(t)) {
                    continue;
                }
                if first.is_empty() || first == "-" {
                    continue;
                }

                let (team_number, team_name) = match self.team_cell_re.captures(&cells[0]) {
                    Some(caps) => (caps[1].to_string(), normalize_whitespace(&caps[2])),
                    None => (String::new(), normalize_whitespace(&cells[0])),
                };
                if team_name.len() < MIN_TEAM_NAME_LEN {
                    continue;
                }

                let stat = |i: usize| cells.get(i).map(|c| parse_count(c)).unwrap_or(0);

                teams.push(TeamStanding {
                    team_number,
                    team_name,
                    wins: stat(1),
                    losses: stat(2),
                    ties: stat(3),
                    goals_for: stat(4),
                    goals_against: stat(5),
                    red_cards: stat(6),
                    points: stat(7),
                    season: season.to_string(),
                    division: division.clone(),
                    age_group: age_group.clone(),
                    subdivision: subdivision_name.clone(),
                    gender: gender.to_string(),
                });
            }
        }

        teams
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_error_page() {
        assert!(is_error_page(
            "<html><body>We could not match this combination.</body></html>"
        ));
        assert!(is_error_page("<html><title>Error</title><body></body></html>"));
        // "error" buried deep in the page body does not count
        let deep = format!("<html>{}error</html>", "x".repeat(600));
        assert!(!is_error_page(&deep));
        assert!(!is_error_page("<html><table></table></html>"));
    }

    #[test]
    fn test_division_tag() {
        assert_eq!(division_tag("Boys", "Premier"), "boys_prem");
        assert_eq!(division_tag("Girls", "Premier"), "girls_prem");
        assert_eq!(division_tag("Boys", "Recreational"), "boys_rec");
        assert_eq!(division_tag("Girls", "Recreational"), "girls_rec");
    }

    #[test]
    fn test_parse_live_response() {
        let html = r#"<html><body><table>
            <tr><th>Team</th><th>W</th><th>L</th><th>T</th><th>GF</th><th>GA</th><th>RC</th><th>Pts</th></tr>
            <tr><td>C789 Blue Valley FC</td><td>4</td><td>1</td><td>2</td><td>15</td><td>7</td><td>0</td><td>14</td></tr>
            <tr><td>Plaza United</td><td>2</td><td>3</td><td>2</td><td>9</td><td>11</td><td>1</td><td>8</td></tr>
        </table></body></html>"#;

        let parser = LiveParser::new().unwrap();
        let teams = parser.parse(html, "2025_fall", "Boys", "Premier", "U-12", "3");
        assert_eq!(teams.len(), 2);

        assert_eq!(teams[0].team_number, "C789");
        assert_eq!(teams[0].team_name, "Blue Valley FC");
        assert_eq!(teams[0].wins, 4);
        assert_eq!(teams[0].division, "boys_prem");
        assert_eq!(teams[0].age_group, "U12");
        assert_eq!(teams[0].subdivision, "U-12 Boys Premier Subdivision 3");

        // No 4-char roster code prefix
        assert_eq!(teams[1].team_number, "");
        assert_eq!(teams[1].team_name, "Plaza United");
    }

    #[test]
    fn test_parse_live_six_columns() {
        // Minimum viable row: stats beyond the cell count default to 0
        let html = r#"<table>
            <tr><td>D012 Shawnee Rush</td><td>1</td><td>2</td><td>0</td><td>4</td><td>6</td></tr>
        </table>"#;

        let parser = LiveParser::new().unwrap();
        let teams = parser.parse(html, "2025_fall", "Girls", "Recreational", "U-11/5th Grade 9v9", "USA");
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].red_cards, 0);
        assert_eq!(teams[0].points, 0);
        assert_eq!(teams[0].division, "girls_rec");
        assert_eq!(teams[0].age_group, "U11");
        assert_eq!(
            teams[0].subdivision,
            "U-11/5th Grade 9v9 Girls Recreational Subdivision USA"
        );
    }

    #[test]
    fn test_short_names_dropped() {
        let html = r#"<table>
            <tr><td>AB</td><td>1</td><td>2</td><td>0</td><td>4</td><td>6</td></tr>
        </table>"#;
        let parser = LiveParser::new().unwrap();
        assert!(parser.parse(html, "2025_fall", "Boys", "Premier", "U-12", "1").is_empty());
    }
}

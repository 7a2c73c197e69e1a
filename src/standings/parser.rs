//! Archive standings HTML parser.
//!
//! Archive pages interleave heading-like elements ("U12 Premier
//! Subdivision 3") with standings tables. Headings are scanned in
//! document order; a qualifying heading sets the (age group, subdivision)
//! context for every table after it until the next qualifying heading.
//! Column mapping is positional (Team | W | L | T | GF | GA | RC | Pts) —
//! the site's tables carry no usable header semantics.

use anyhow::{Context, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::types::{TeamStanding, parse_gender};

/// Minimum cell count for an archive data row.
const MIN_ARCHIVE_CELLS: usize = 8;

/// First-cell tokens that mark a header row rather than a team row.
const HEADER_TOKENS: &[&str] = &["#", "team", "number", ""];

/// Collapse all runs of whitespace to single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of an element with whitespace normalized.
pub fn element_text(el: ElementRef) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Coerce a cell's text to a count. Strips every character that is not a
/// digit or a minus sign; an empty or unparseable remainder yields 0.
///
/// `"12*"` → 12; `"-"` → 0; `""` → 0.
pub fn parse_count(raw: &str) -> u32 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0)
}

pub struct ArchiveParser {
    element_sel: Selector,
    row_sel: Selector,
    cell_sel: Selector,
    age_re: Regex,
    team_cell_re: Regex,
}

impl ArchiveParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            element_sel: Selector::parse("h2, h3, h4, table, p, b, strong")
                .map_err(|e| anyhow::anyhow!("selector error: {}", e))?,
            row_sel: Selector::parse("tr").map_err(|e| anyhow::anyhow!("selector error: {}", e))?,
            cell_sel: Selector::parse("td, th")
                .map_err(|e| anyhow::anyhow!("selector error: {}", e))?,
            age_re: Regex::new(r"(?i)U-?(\d+)").context("Failed to compile age regex")?,
            team_cell_re: Regex::new(r"^([0-9A-Za-z]{4})\s+(.+)$")
                .context("Failed to compile team cell regex")?,
        })
    }

    /// Extract a "U12"-style age group label, or "Unknown".
    pub fn extract_age_group(&self, text: &str) -> String {
        match self.age_re.captures(text) {
            Some(caps) => format!("U{}", &caps[1]),
            None => "Unknown".to_string(),
        }
    }

    /// Split a first cell into (roster code, team name). The code is a
    /// fixed-width 4-character alphanumeric prefix; cells without one are
    /// all name.
    pub fn split_team_cell(&self, cell: &str) -> (String, String) {
        match self.team_cell_re.captures(cell) {
            Some(caps) => (caps[1].to_string(), normalize_whitespace(&caps[2])),
            None => (String::new(), normalize_whitespace(cell)),
        }
    }

    /// Parse a full archive page into standings records. Unparsable pages
    /// yield an empty list, never an error.
    pub fn parse(&self, html: &str, season: &str, division: &str) -> Vec<TeamStanding> {
        let document = Html::parse_document(html);
        let gender = parse_gender(division);

        let mut teams = Vec::new();
        let mut age_group = "Unknown".to_string();
        let mut subdivision = "Unknown".to_string();

        for element in document.select(&self.element_sel) {
            if element.value().name() == "table" {
                self.parse_table(
                    element,
                    season,
                    division,
                    gender,
                    &age_group,
                    &subdivision,
                    &mut teams,
                );
                continue;
            }

            // Heading-like element: qualifies as a section marker only
            // with both an age pattern and a division keyword.
            let text = element_text(element);
            if self.age_re.is_match(&text)
                && (text.contains("Subdivision")
                    || text.contains("Division")
                    || text.contains("Premier")
                    || text.contains("Recreational"))
            {
                age_group = self.extract_age_group(&text);
                subdivision = text;
            }
        }

        teams
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_table(
        &self,
        table: ElementRef,
        season: &str,
        division: &str,
        gender: &str,
        age_group: &str,
        subdivision: &str,
        out: &mut Vec<TeamStanding>,
    ) {
        for row in table.select(&self.row_sel) {
            let cells: Vec<String> = row.select(&self.cell_sel).map(element_text).collect();
            if cells.len() < MIN_ARCHIVE_CELLS {
                continue;
            }

            let first = cells[0].to_lowercase();
            if HEADER_TOKENS.contains(&first.as_str()) || first.contains("subdivision") {
                continue;
            }
            if first.contains("win") || first.contains("lose") {
                continue;
            }

            let (team_number, team_name) = self.split_team_cell(&cells[0]);
            if team_name.is_empty() || team_name == "-" {
                continue;
            }

            let stat = |i: usize| cells.get(i).map(|c| parse_count(c)).unwrap_or(0);

            out.push(TeamStanding {
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
                division: division.to_string(),
                age_group: age_group.to_string(),
                subdivision: subdivision.to_string(),
                gender: gender.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ArchiveParser {
        ArchiveParser::new().unwrap()
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12"), 12);
        assert_eq!(parse_count("12*"), 12);
        assert_eq!(parse_count("1,234"), 1234);
        assert_eq!(parse_count("-"), 0);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("n/a"), 0);
    }

    #[test]
    fn test_split_team_cell() {
        let p = parser();
        assert_eq!(
            p.split_team_cell("A123 FC Dallas"),
            ("A123".to_string(), "FC Dallas".to_string())
        );
        assert_eq!(
            p.split_team_cell("FC Dallas"),
            ("".to_string(), "FC Dallas".to_string())
        );
        // Whitespace in the name is collapsed
        assert_eq!(
            p.split_team_cell("B456   Sporting   KC"),
            ("B456".to_string(), "Sporting KC".to_string())
        );
        // Prefix must be exactly 4 alphanumerics followed by whitespace
        assert_eq!(
            p.split_team_cell("A12 Rush"),
            ("".to_string(), "A12 Rush".to_string())
        );
    }

    #[test]
    fn test_extract_age_group() {
        let p = parser();
        assert_eq!(p.extract_age_group("U-12 Premier"), "U12");
        assert_eq!(p.extract_age_group("u14 something"), "U14");
        assert_eq!(p.extract_age_group("Open Division"), "Unknown");
    }

    fn row(cells: &[&str]) -> String {
        let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr>{}</tr>", tds)
    }

    #[test]
    fn test_parse_archive_page() {
        let html = format!(
            r#"<html><body>
            <h3>U12 Premier Subdivision 3</h3>
            <table>
            {}
            {}
            {}
            </table>
            </body></html>"#,
            row(&["Team", "Win", "Lose", "Tie", "GF", "GA", "RC", "Pts"]),
            row(&["A123 FC Dallas", "5", "2", "1", "20", "8", "0", "16"]),
            row(&["B456 Sporting KC", "3", "4", "1", "12", "15", "1", "10"]),
        );

        let teams = parser().parse(&html, "2024_fall", "boys_prem");
        assert_eq!(teams.len(), 2);

        let first = &teams[0];
        assert_eq!(first.team_number, "A123");
        assert_eq!(first.team_name, "FC Dallas");
        assert_eq!(first.wins, 5);
        assert_eq!(first.losses, 2);
        assert_eq!(first.ties, 1);
        assert_eq!(first.goals_for, 20);
        assert_eq!(first.goals_against, 8);
        assert_eq!(first.points, 16);
        assert_eq!(first.gender, "Boys");

        for team in &teams {
            assert_eq!(team.age_group, "U12");
            assert_eq!(team.subdivision, "U12 Premier Subdivision 3");
            assert_eq!(team.season, "2024_fall");
        }
    }

    #[test]
    fn test_heading_needs_keyword_and_age() {
        // Age pattern without a division keyword is not a section marker
        let html = format!(
            "<h3>U12 Roster Notes</h3><table>{}</table>",
            row(&["A123 FC Dallas", "5", "2", "1", "20", "8", "0", "16"]),
        );
        let teams = parser().parse(&html, "2024_fall", "boys_prem");
        assert_eq!(teams[0].age_group, "Unknown");
        assert_eq!(teams[0].subdivision, "Unknown");

        // Keyword without an age pattern is not a section marker either
        let html = format!(
            "<h3>Premier Standings</h3><table>{}</table>",
            row(&["A123 FC Dallas", "5", "2", "1", "20", "8", "0", "16"]),
        );
        let teams = parser().parse(&html, "2024_fall", "boys_prem");
        assert_eq!(teams[0].subdivision, "Unknown");
    }

    #[test]
    fn test_section_context_applies_to_later_tables() {
        let html = format!(
            r#"<h3>U10 Premier Subdivision 1</h3>
            <table>{}</table>
            <table>{}</table>
            <h3>U11 Premier Subdivision 2</h3>
            <table>{}</table>"#,
            row(&["A111 First FC", "1", "0", "0", "2", "1", "0", "3"]),
            row(&["A222 Second FC", "0", "1", "0", "1", "2", "0", "0"]),
            row(&["A333 Third FC", "2", "0", "0", "5", "0", "0", "6"]),
        );
        let teams = parser().parse(&html, "2024_fall", "girls_prem");
        assert_eq!(teams.len(), 3);
        assert_eq!(teams[0].age_group, "U10");
        assert_eq!(teams[1].age_group, "U10");
        assert_eq!(teams[2].age_group, "U11");
        assert_eq!(teams[2].subdivision, "U11 Premier Subdivision 2");
    }

    #[test]
    fn test_short_rows_dropped() {
        let html = format!(
            "<table>{}</table>",
            row(&["A123 FC Dallas", "5", "2", "1", "20", "8"]),
        );
        assert!(parser().parse(&html, "2024_fall", "boys_prem").is_empty());
    }

    #[test]
    fn test_header_rows_dropped() {
        let html = format!(
            "<table>{}{}{}</table>",
            row(&["#", "W", "L", "T", "GF", "GA", "RC", "Pts"]),
            row(&["Subdivision 3", "W", "L", "T", "GF", "GA", "RC", "Pts"]),
            row(&["Wins", "1", "2", "3", "4", "5", "6", "7"]),
        );
        assert!(parser().parse(&html, "2024_fall", "boys_prem").is_empty());
    }

    #[test]
    fn test_dash_name_dropped() {
        let html = format!(
            "<table>{}</table>",
            row(&["-", "5", "2", "1", "20", "8", "0", "16"]),
        );
        assert!(parser().parse(&html, "2024_fall", "boys_prem").is_empty());
    }

    #[test]
    fn test_unparsable_page_yields_empty() {
        assert!(parser().parse("<html><body><p>nothing here</p></body></html>", "2024_fall", "boys_prem").is_empty());
        assert!(parser().parse("", "2024_fall", "boys_prem").is_empty());
    }
}

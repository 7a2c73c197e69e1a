//! Listing and schedule page parsers for tournament discovery.
//!
//! Identifiers are pulled out of anchor targets by regex; names, states
//! and age/gender labels are best-effort inferences from the surrounding
//! markup.

use anyhow::{Context, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use super::types::{GroupTarget, Tournament};
use crate::config::DiscoveryConfig;

/// Name/division labels are truncated to the store's column width.
const MAX_LABEL_LEN: usize = 255;

/// Full state names accepted in location text alongside two-letter codes.
const STATE_NAMES: &[(&str, &str)] = &[
    ("texas", "TX"),
    ("california", "CA"),
    ("florida", "FL"),
    ("virginia", "VA"),
    ("georgia", "GA"),
    ("north carolina", "NC"),
    ("pennsylvania", "PA"),
    ("new york", "NY"),
    ("new jersey", "NJ"),
    ("maryland", "MD"),
    ("illinois", "IL"),
    ("ohio", "OH"),
    ("colorado", "CO"),
    ("arizona", "AZ"),
    ("washington", "WA"),
    ("missouri", "MO"),
    ("kansas", "KS"),
];

fn truncate_label(s: &str) -> String {
    if s.len() > MAX_LABEL_LEN {
        let mut end = MAX_LABEL_LEN;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s[..end].to_string()
    } else {
        s.to_string()
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the nearest `tr`/`div`/`li`/`td` ancestor, used as the
/// location/context blob around an anchor.
fn container_text(el: ElementRef) -> String {
    for node in el.ancestors() {
        if let Some(parent) = ElementRef::wrap(node) {
            if matches!(parent.value().name(), "tr" | "div" | "li" | "td") {
                return normalize_whitespace(&parent.text().collect::<Vec<_>>().join(" "));
            }
        }
    }
    String::new()
}

pub struct DiscoveryParser {
    anchor_sel: Selector,
    event_re: Regex,
    group_re: Regex,
    state_re: Regex,
    age_re: Regex,
    birth_year_re: Regex,
    boys_re: Regex,
    girls_re: Regex,
}

impl DiscoveryParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            anchor_sel: Selector::parse("a[href]")
                .map_err(|e| anyhow::anyhow!("selector error: {}", e))?,
            event_re: Regex::new(r"/org_event/events/(\d+)")
                .context("Failed to compile event regex")?,
            group_re: Regex::new(r"group=(\d+)").context("Failed to compile group regex")?,
            state_re: Regex::new(r",\s*([A-Z]{2})(?:\s|$|,)")
                .context("Failed to compile state regex")?,
            age_re: Regex::new(r"u[- ]?(\d{1,2})").context("Failed to compile age regex")?,
            birth_year_re: Regex::new(r"\b(20[01]\d)\b")
                .context("Failed to compile birth year regex")?,
            boys_re: Regex::new(r"\bb\d{2}").context("Failed to compile boys regex")?,
            girls_re: Regex::new(r"\bg\d{2}").context("Failed to compile girls regex")?,
        })
    }

    /// Extract a two-letter state code from free-form location text.
    /// Codes outside the target list are ignored (they are usually false
    /// positives like "FC" or "SC" in club names).
    pub fn extract_state(&self, location: &str, target_states: &[String]) -> Option<String> {
        if location.is_empty() {
            return None;
        }

        if let Some(caps) = self.state_re.captures(location) {
            let code = caps[1].to_string();
            if target_states.contains(&code) {
                return Some(code);
            }
        }

        let lower = location.to_lowercase();
        for (name, code) in STATE_NAMES {
            if lower.contains(name) {
                return Some(code.to_string());
            }
        }

        None
    }

    /// Infer a "U<n>" age group from a division label: either a literal
    /// U-number or a four-digit birth year (age = current year - birth
    /// year). The label must already be lower-cased.
    pub fn infer_age_group(&self, lower_name: &str, current_year: i32) -> Option<String> {
        if let Some(caps) = self.age_re.captures(lower_name) {
            return Some(format!("U{}", &caps[1]));
        }
        if let Some(caps) = self.birth_year_re.captures(lower_name) {
            let birth_year: i32 = caps[1].parse().ok()?;
            return Some(format!("U{}", current_year - birth_year));
        }
        None
    }

    /// Infer gender from substring/regex cues in a lower-cased label.
    pub fn infer_gender(&self, lower_name: &str) -> Option<String> {
        if lower_name.contains("boys") || lower_name.contains(" b ") || self.boys_re.is_match(lower_name)
        {
            Some("Boys".to_string())
        } else if lower_name.contains("girls")
            || lower_name.contains(" g ")
            || self.girls_re.is_match(lower_name)
        {
            Some("Girls".to_string())
        } else {
            None
        }
    }

    /// Parse one listing page, collecting tournaments whose event id has
    /// not been seen yet this run. Returns the new tournaments; `seen`
    /// is updated in place.
    pub fn parse_listing(
        &self,
        html: &str,
        target_states: &[String],
        seen: &mut HashSet<String>,
    ) -> Vec<Tournament> {
        let document = Html::parse_document(html);
        let mut tournaments = Vec::new();

        for anchor in document.select(&self.anchor_sel) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(caps) = self.event_re.captures(href) else {
                continue;
            };
            let event_id = caps[1].to_string();

            if !seen.insert(event_id.clone()) {
                continue;
            }

            let text = normalize_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));
            let name = if text.is_empty() {
                format!("Event {}", event_id)
            } else {
                truncate_label(&text)
            };

            let location = container_text(anchor);
            let state = self.extract_state(&location, target_states);

            tournaments.push(Tournament { event_id, name, state });
        }

        tournaments
    }

    /// Parse an event's schedule page into its unique group targets.
    pub fn parse_groups(
        &self,
        html: &str,
        event_id: &str,
        config: &DiscoveryConfig,
        current_year: i32,
    ) -> Vec<GroupTarget> {
        let document = Html::parse_document(html);
        let mut groups = Vec::new();
        let mut seen = HashSet::new();

        for anchor in document.select(&self.anchor_sel) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(caps) = self.group_re.captures(href) else {
                continue;
            };
            let group_id = caps[1].to_string();

            if !seen.insert(group_id.clone()) {
                continue;
            }

            let mut division_name =
                normalize_whitespace(&anchor.text().collect::<Vec<_>>().join(" "));
            if division_name.is_empty() {
                division_name = container_text(anchor);
            }

            let (age_group, gender) = if division_name.is_empty() {
                (None, None)
            } else {
                let lower = division_name.to_lowercase();
                (
                    self.infer_age_group(&lower, current_year),
                    self.infer_gender(&lower),
                )
            };

            groups.push(GroupTarget {
                event_id: event_id.to_string(),
                group_id: group_id.clone(),
                url: config.group_url(event_id, &group_id),
                division_name: (!division_name.is_empty()).then(|| truncate_label(&division_name)),
                age_group,
                gender,
            });
        }

        groups
    }
}

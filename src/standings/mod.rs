//! Team standings scraper.
//!
//! Past seasons live on static archive pages; the current season is only
//! reachable through a CGI form endpoint queried one (gender, level, age,
//! subdivision) combination at a time.

pub mod live;
pub mod output;
pub mod parser;
pub mod scraper;
pub mod types;

pub use scraper::StandingsScraper;
pub use types::{TeamStanding, season_code, seasons_for_years};

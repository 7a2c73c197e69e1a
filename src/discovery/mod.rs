//! Tournament and age-group discovery.
//!
//! Paginates the hosting site's tournament listing, drills into each
//! event's schedule page for age/gender group URLs, and upserts both
//! into the remote table store as future scrape targets.

pub mod parser;
pub mod runner;
pub mod store;
pub mod types;

pub use runner::{DiscoveryRunner, DiscoverySummary};
pub use types::{GroupTarget, Tournament};

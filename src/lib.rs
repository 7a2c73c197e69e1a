//! Data-collection tools for youth soccer league data.
//!
//! Two independent pipelines share this library:
//! - `standings`: scrapes team standings from static archive pages and a
//!   live CGI form endpoint, then writes CSV/JSON dumps plus two
//!   denormalized JSON shapes for database ingestion.
//! - `discover`: paginates a tournament listing site, drills into each
//!   event for age/gender group schedule URLs, and upserts the results
//!   into a Supabase-hosted table store.

pub mod config;
pub mod discovery;
pub mod fetch;
pub mod logging;
pub mod standings;

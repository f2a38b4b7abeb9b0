//! Scraping engine for Dutch property listings.
//!
//! [`ListingScraper::scrape_listing`] takes a listing URL and always returns a
//! [`ScrapeOutcome`]: a fully shaped [`PropertyRecord`] on success, or a
//! classified error code with attempt and timing metadata.

pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;

pub use config::ScrapeConfig;
pub use error::{ErrorCode, ScrapeError};
pub use models::{PropertyRecord, ScrapeOutcome};
pub use scrapers::{ListingScraper, ScrapeOptions};

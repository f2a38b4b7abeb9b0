pub mod backoff;
pub mod detection;
pub mod extract;
pub mod fetch;
pub mod listing;
pub mod listing_url;

pub use detection::{BotDetector, Classification};
pub use extract::ExtractionEngine;
pub use fetch::{AttemptContext, Fetcher, HttpFetcher};
pub use listing::{ListingScraper, ListingSource, ScrapeOptions};
pub use listing_url::{ListingUrl, ListingUrlRules, UrlKind};

use crate::scrapers::listing_url::ListingUrl;
use scraper::Html;
use tracing::debug;

/// What every extraction stage gets to look at
#[derive(Clone, Copy)]
pub struct Page<'a> {
    pub document: &'a Html,
    pub url: &'a ListingUrl,
}

impl<'a> Page<'a> {
    pub fn new(document: &'a Html, url: &'a ListingUrl) -> Self {
        Self { document, url }
    }
}

pub type StageFn = fn(&Page<'_>) -> Option<String>;

/// One heuristic for one field.
#[derive(Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub run: StageFn,
}

impl Stage {
    pub const fn new(name: &'static str, run: StageFn) -> Self {
        Self { name, run }
    }
}

/// Ordered stages for a field; the first stage returning a value wins.
#[derive(Clone, Copy)]
pub struct Cascade {
    pub field: &'static str,
    pub stages: &'static [Stage],
    pub sentinel: &'static str,
}

impl Cascade {
    pub fn first_match(&self, page: &Page<'_>) -> Option<(&'static str, String)> {
        self.stages
            .iter()
            .find_map(|stage| (stage.run)(page).map(|value| (stage.name, value)))
    }

    /// Never fails: a field nothing matched gets its sentinel.
    pub fn resolve(&self, page: &Page<'_>) -> String {
        match self.first_match(page) {
            Some((stage, value)) => {
                debug!(field = self.field, stage, value = %value, "Field extracted");
                value
            }
            None => {
                debug!(field = self.field, "No stage matched, using sentinel");
                self.sentinel.to_string()
            }
        }
    }
}

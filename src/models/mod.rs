use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod order;
pub mod outcome;

pub use order::{BuyerContact, NewOrder, OrderStatus, OrderStore, PaymentStatus};
pub use outcome::ScrapeOutcome;

/// Placeholder for a field no extraction stage could fill
pub const NOT_FOUND: &str = "Not found";
pub const ADDRESS_NOT_FOUND: &str = "Address not found";
pub const PRICE_NOT_FOUND: &str = "Price not found";
pub const LOCATION_NOT_FOUND: &str = "Location not found";

/// Source of the property listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Source {
    Funda,
    Jaap,
}

/// Structured facts scraped from one listing page.
///
/// Text fields are always populated; a field nothing matched holds its sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyRecord {
    pub source: Source,
    pub url: String,
    pub title: String,
    pub address: String,
    /// Display string, currency and cost suffix kept verbatim (`€ 450.000 k.k.`)
    pub price: String,
    pub location: String,
    pub property_type: String,
    pub surface: String,
    pub rooms: String,
    pub year_built: String,
    pub images: Vec<String>,
    pub description: String,
    /// `"label: value"` pairs from the listing's feature table
    pub features: Vec<String>,
    pub scraped_at: DateTime<Utc>,
}

/// The handful of fields shown on the checkout page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertySummary {
    pub address: String,
    pub price: String,
    pub property_type: String,
    pub surface: String,
    pub rooms: String,
}

impl PropertyRecord {
    /// Names of text fields still holding a sentinel.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("title", &self.title),
            ("address", &self.address),
            ("price", &self.price),
            ("location", &self.location),
            ("property_type", &self.property_type),
            ("surface", &self.surface),
            ("rooms", &self.rooms),
            ("year_built", &self.year_built),
            ("description", &self.description),
        ]
        .into_iter()
        .filter(|(_, value)| is_sentinel(value))
        .map(|(name, _)| name)
        .collect()
    }

    pub fn summary(&self) -> PropertySummary {
        PropertySummary {
            address: self.address.clone(),
            price: self.price.clone(),
            property_type: self.property_type.clone(),
            surface: self.surface.clone(),
            rooms: self.rooms.clone(),
        }
    }
}

pub fn is_sentinel(value: &str) -> bool {
    matches!(
        value,
        NOT_FOUND | ADDRESS_NOT_FOUND | PRICE_NOT_FOUND | LOCATION_NOT_FOUND
    )
}

#[cfg(test)]
pub(crate) fn sample_record() -> PropertyRecord {
    PropertyRecord {
        source: Source::Funda,
        url: "https://www.funda.nl/koop/utrecht/huis-12345678-teststraat-1/".to_string(),
        title: "Teststraat 1".to_string(),
        address: "Teststraat 1, Utrecht".to_string(),
        price: "€ 450.000 k.k.".to_string(),
        location: "Utrecht".to_string(),
        property_type: NOT_FOUND.to_string(),
        surface: "120 m²".to_string(),
        rooms: "5 kamers (3 slaapkamers)".to_string(),
        year_built: NOT_FOUND.to_string(),
        images: vec![],
        description: NOT_FOUND.to_string(),
        features: vec![],
        scraped_at: Utc::now(),
    }
}

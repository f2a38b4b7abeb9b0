//! Turns a listing page into a [`PropertyRecord`].
//!
//! Each site has a [`SiteStrategy`]: one [`Cascade`] per text field, tried
//! structural selectors first, then keyword/pattern scans, then (for the
//! address) the URL itself. A field nothing matched holds its sentinel.

pub mod cascade;
pub mod funda;
pub mod jaap;
pub mod patterns;
pub mod text;

pub use cascade::{Cascade, Page, Stage};

use crate::config::{ExtractorKind, ScrapeConfig, SiteConfig};
use crate::error::{Result, ScrapeError};
use crate::models::{is_sentinel, PropertyRecord, Source};
use crate::scrapers::listing_url::ListingUrl;
use chrono::Utc;
use scraper::Html;
use text::{label_value_pairs, select_all, truncate_chars};
use tracing::debug;

/// Extraction recipe for one listing site
pub struct SiteStrategy {
    pub source: Source,
    pub title: Cascade,
    pub address: Cascade,
    pub price: Cascade,
    pub location: Cascade,
    pub property_type: Cascade,
    pub surface: Cascade,
    pub rooms: Cascade,
    pub year_built: Cascade,
    pub description: Cascade,
    pub image_selectors: &'static [&'static str],
    pub feature_labels: &'static str,
}

impl ExtractorKind {
    pub fn strategy(self) -> &'static SiteStrategy {
        match self {
            ExtractorKind::Funda => &funda::STRATEGY,
            ExtractorKind::Jaap => &jaap::STRATEGY,
        }
    }
}

/// Caps applied to list and prose fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_images: usize,
    pub max_features: usize,
    pub max_description_length: usize,
}

impl From<&ScrapeConfig> for Limits {
    fn from(config: &ScrapeConfig) -> Self {
        Self {
            max_images: config.max_images,
            max_features: config.max_features,
            max_description_length: config.max_description_length,
        }
    }
}

pub struct ExtractionEngine {
    sites: Vec<SiteConfig>,
    limits: Limits,
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::from_config(&ScrapeConfig::default())
    }
}

impl ExtractionEngine {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            sites: config.sites.clone(),
            limits: Limits::from(config),
        }
    }

    pub fn strategy_for(&self, host: &str) -> Result<&'static SiteStrategy> {
        self.sites
            .iter()
            .find(|site| site.domain.eq_ignore_ascii_case(host))
            .map(|site| site.extractor.strategy())
            .ok_or_else(|| ScrapeError::UnsupportedDomain(host.to_string()))
    }

    /// Parses the body and extracts. An empty body is the only parse failure.
    pub fn extract_html(&self, html: &str, url: &ListingUrl) -> Result<PropertyRecord> {
        if html.trim().is_empty() {
            return Err(ScrapeError::Parse("empty response body".to_string()));
        }
        let document = Html::parse_document(html);
        self.extract(&document, url)
    }

    pub fn extract(&self, document: &Html, url: &ListingUrl) -> Result<PropertyRecord> {
        let strategy = self.strategy_for(url.host())?;
        let page = Page::new(document, url);

        let mut description = strategy.description.resolve(&page);
        if !is_sentinel(&description) {
            description = truncate_chars(&description, self.limits.max_description_length);
        }

        let record = PropertyRecord {
            source: strategy.source,
            url: url.to_string(),
            title: strategy.title.resolve(&page),
            address: strategy.address.resolve(&page),
            price: strategy.price.resolve(&page),
            location: strategy.location.resolve(&page),
            property_type: strategy.property_type.resolve(&page),
            surface: strategy.surface.resolve(&page),
            rooms: strategy.rooms.resolve(&page),
            year_built: strategy.year_built.resolve(&page),
            images: collect_images(document, strategy.image_selectors, self.limits.max_images),
            description,
            features: collect_features(document, strategy.feature_labels, self.limits.max_features),
            scraped_at: Utc::now(),
        };

        debug!(
            url = %url,
            images = record.images.len(),
            features = record.features.len(),
            missing = ?record.missing_fields(),
            "Extraction finished"
        );

        Ok(record)
    }
}

const IMAGE_ATTRS: &[&str] = &["src", "data-src", "data-lazy", "data-original"];
const PLACEHOLDER_HINTS: &[&str] = &["placeholder", "loading", "spinner"];

/// Gallery images in selector order: deduplicated, absolute, no spinners.
pub fn collect_images(document: &Html, selectors: &[&str], max: usize) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();

    for css in selectors {
        for img in select_all(document, css) {
            let Some(src) = IMAGE_ATTRS.iter().find_map(|attr| img.value().attr(attr)) else {
                continue;
            };
            if PLACEHOLDER_HINTS.iter().any(|hint| src.contains(hint)) {
                continue;
            }

            let absolute = match src.strip_prefix("//") {
                Some(rest) => format!("https://{}", rest),
                None => src.to_string(),
            };
            if absolute.starts_with("http") && !images.contains(&absolute) {
                images.push(absolute);
            }
        }
    }

    images.truncate(max);
    images
}

pub fn collect_features(document: &Html, label_css: &str, max: usize) -> Vec<String> {
    let mut features = label_value_pairs(document, label_css);
    features.truncate(max);
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ADDRESS_NOT_FOUND, LOCATION_NOT_FOUND, NOT_FOUND, PRICE_NOT_FOUND};
    use crate::scrapers::listing_url::ListingUrlRules;

    fn url(raw: &str) -> ListingUrl {
        ListingUrlRules::default().parse(raw).unwrap()
    }

    #[test]
    fn test_images_are_cleaned_and_capped() {
        let document = Html::parse_document(
            r#"<div class="media-gallery">
                <img src="//cloud.funda.nl/a.jpg">
                <img data-src="https://cloud.funda.nl/b.jpg">
                <img src="https://cloud.funda.nl/loading.gif">
                <img src="/relative.jpg">
                <img src="https://cloud.funda.nl/a.jpg">
              </div>
              <div class="gallery"><img data-original="https://cloud.funda.nl/c.jpg"></div>"#,
        );

        assert_eq!(
            collect_images(&document, funda::STRATEGY.image_selectors, 20),
            vec![
                "https://cloud.funda.nl/a.jpg",
                "https://cloud.funda.nl/b.jpg",
                "https://cloud.funda.nl/c.jpg",
            ]
        );
        assert_eq!(
            collect_images(&document, funda::STRATEGY.image_selectors, 2).len(),
            2
        );
    }

    #[test]
    fn test_features_are_capped() {
        let rows: String = (0..60)
            .map(|i| format!("<dt>Kenmerk {}</dt><dd>Waarde {}</dd>", i, i))
            .collect();
        let document = Html::parse_document(&format!("<dl>{}</dl>", rows));

        let features = collect_features(&document, "dt", 50);
        assert_eq!(features.len(), 50);
        assert_eq!(features[0], "Kenmerk 0: Waarde 0");
    }

    #[test]
    fn test_unsupported_domain() {
        let config = ScrapeConfig {
            sites: vec![SiteConfig::new("www.funda.nl", ExtractorKind::Funda)],
            ..ScrapeConfig::default()
        };
        let engine = ExtractionEngine::from_config(&config);
        let jaap = url("https://www.jaap.nl/koop/zwolle/woning-44444444-diezerstraat-3/");

        assert_eq!(
            engine.extract_html("<html></html>", &jaap).unwrap_err(),
            ScrapeError::UnsupportedDomain("www.jaap.nl".into())
        );
    }

    #[test]
    fn test_empty_body_is_parse_error() {
        let engine = ExtractionEngine::default();
        let listing = url("https://www.funda.nl/koop/utrecht/huis-12345678-teststraat-1/");
        assert!(matches!(
            engine.extract_html("  \n", &listing),
            Err(ScrapeError::Parse(_))
        ));
    }

    #[test]
    fn test_bare_document_is_fully_shaped() {
        let engine = ExtractionEngine::default();
        let listing = url("https://www.funda.nl/detail/koop/deil/huis-appeldijk-5/12345678/");
        let record = engine
            .extract_html("<html><body><nav>menu</nav></body></html>", &listing)
            .unwrap();

        assert_eq!(record.source, Source::Funda);
        assert_eq!(record.price, PRICE_NOT_FOUND);
        assert_eq!(record.location, LOCATION_NOT_FOUND);
        assert_eq!(record.rooms, NOT_FOUND);
        assert_eq!(record.address, "Appeldijk 5, Deil");
        assert_ne!(record.address, ADDRESS_NOT_FOUND);
        assert!(record.images.is_empty());
        assert!(record.features.is_empty());
    }

    #[test]
    fn test_description_is_truncated() {
        let config = ScrapeConfig {
            max_description_length: 60,
            ..ScrapeConfig::default()
        };
        let engine = ExtractionEngine::from_config(&config);
        let listing = url("https://www.funda.nl/koop/utrecht/huis-12345678-teststraat-1/");
        let html = format!(
            r#"<html><body><div class="object-description-body">{}</div></body></html>"#,
            "Sfeervolle jaren dertig woning met veel authentieke details. ".repeat(4)
        );

        let record = engine.extract_html(&html, &listing).unwrap();
        assert!(record.description.chars().count() <= 60);
        assert!(record.description.starts_with("Sfeervolle jaren dertig"));
    }
}

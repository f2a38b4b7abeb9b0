use super::cascade::{Cascade, Page, Stage};
use super::funda::description_in;
use super::patterns;
use super::text::first_text;
use super::SiteStrategy;
use crate::models::{Source, ADDRESS_NOT_FOUND, LOCATION_NOT_FOUND, NOT_FOUND, PRICE_NOT_FOUND};

const IMAGE_SELECTORS: &[&str] = &[".property-photos img", ".gallery img", ".photo img"];

fn title(page: &Page<'_>) -> Option<String> {
    first_text(page.document, &[".property-title", "h1"])
}

fn address(page: &Page<'_>) -> Option<String> {
    first_text(page.document, &[".property-address", ".address"])
}

fn price(page: &Page<'_>) -> Option<String> {
    first_text(page.document, &[".property-price", ".price"])
        .and_then(|text| patterns::price_in(&text))
}

fn location(page: &Page<'_>) -> Option<String> {
    first_text(page.document, &[".property-location", ".location"])
}

fn property_type(page: &Page<'_>) -> Option<String> {
    first_text(page.document, &[".property-type", ".type"])
}

fn surface(page: &Page<'_>) -> Option<String> {
    first_text(page.document, &[".property-surface", ".surface"])
        .and_then(|text| patterns::surface_in(&text))
}

fn rooms(page: &Page<'_>) -> Option<String> {
    first_text(page.document, &[".property-rooms", ".rooms"])
        .and_then(|text| patterns::rooms_in(&text))
}

fn year_built(page: &Page<'_>) -> Option<String> {
    first_text(page.document, &[".property-year", ".year"])
        .and_then(|text| patterns::year_in(&text))
}

fn description(page: &Page<'_>) -> Option<String> {
    description_in(page, &[".property-description", ".description"])
}

pub static STRATEGY: SiteStrategy = SiteStrategy {
    source: Source::Jaap,
    title: Cascade {
        field: "title",
        stages: &[
            Stage::new("structural", title),
            Stage::new("title-tag", patterns::title_tag),
        ],
        sentinel: NOT_FOUND,
    },
    address: Cascade {
        field: "address",
        stages: &[
            Stage::new("structural", address),
            Stage::new("pattern", patterns::address),
            Stage::new("url", patterns::address_from_url),
        ],
        sentinel: ADDRESS_NOT_FOUND,
    },
    price: Cascade {
        field: "price",
        stages: &[
            Stage::new("structural", price),
            Stage::new("pattern", patterns::price),
        ],
        sentinel: PRICE_NOT_FOUND,
    },
    location: Cascade {
        field: "location",
        stages: &[
            Stage::new("structural", location),
            Stage::new("pattern", patterns::location),
        ],
        sentinel: LOCATION_NOT_FOUND,
    },
    property_type: Cascade {
        field: "property_type",
        stages: &[
            Stage::new("structural", property_type),
            Stage::new("pattern", patterns::property_type),
        ],
        sentinel: NOT_FOUND,
    },
    surface: Cascade {
        field: "surface",
        stages: &[
            Stage::new("structural", surface),
            Stage::new("pattern", patterns::surface),
        ],
        sentinel: NOT_FOUND,
    },
    rooms: Cascade {
        field: "rooms",
        stages: &[
            Stage::new("structural", rooms),
            Stage::new("pattern", patterns::rooms),
        ],
        sentinel: NOT_FOUND,
    },
    year_built: Cascade {
        field: "year_built",
        stages: &[
            Stage::new("structural", year_built),
            Stage::new("pattern", patterns::year_built),
        ],
        sentinel: NOT_FOUND,
    },
    description: Cascade {
        field: "description",
        stages: &[
            Stage::new("structural", description),
            Stage::new("pattern", patterns::description),
        ],
        sentinel: NOT_FOUND,
    },
    image_selectors: IMAGE_SELECTORS,
    feature_labels: "dt",
};

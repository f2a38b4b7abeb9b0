use super::cascade::{Cascade, Page, Stage};
use super::patterns;
use super::text::{char_len, element_text, first_text, labeled_value, select_all};
use super::SiteStrategy;
use crate::models::{Source, ADDRESS_NOT_FOUND, LOCATION_NOT_FOUND, NOT_FOUND, PRICE_NOT_FOUND};

/// Label elements of the feature tables: classic `<dl>` lists and the
/// highlighted strip at the top of the page.
const LABELS: &str = "dt, .kenmerken-highlighted__label";

const TITLE_SELECTORS: &[&str] = &[
    "h1",
    ".object-header__title",
    "[data-test-id=\"street-name-house-number\"]",
    ".listing-title",
    ".property-title",
    ".house-title",
    ".object-title",
    ".detail-title",
    "[data-testid*=\"title\"]",
    ".listing-address",
];

const PRICE_SELECTORS: &[&str] = &[
    ".object-header__price",
    "[data-test-id=\"price-label\"]",
    "[data-testid=\"price\"]",
    ".object-price",
    ".detail-price",
    ".price",
];

const DESCRIPTION_SELECTORS: &[&str] = &[
    ".object-description-body",
    ".listing-description-text",
    ".object-description",
    ".property-description",
    ".description",
    "[data-testid*=\"description\"]",
];

const IMAGE_SELECTORS: &[&str] = &[
    ".media-gallery img",
    ".object-media img",
    ".photo img",
    ".detail-media img",
    ".media-viewer img",
    ".gallery img",
    ".object-photos img",
    ".detail-photos img",
    ".media-slider img",
    ".photos-slider img",
];

fn title(page: &Page<'_>) -> Option<String> {
    first_text(page.document, TITLE_SELECTORS)
}

/// Street heading plus the postcode/city subtitle.
fn address(page: &Page<'_>) -> Option<String> {
    let street = first_text(
        page.document,
        &["[data-test-id=\"street-name-house-number\"]", ".object-header__title"],
    )
    .filter(|s| s.chars().any(|c| c.is_ascii_digit()))?;
    let city = first_text(
        page.document,
        &["[data-test-id=\"city\"]", ".object-header__subtitle"],
    );
    Some(match city {
        Some(city) => format!("{}, {}", street, city),
        None => street,
    })
}

fn price(page: &Page<'_>) -> Option<String> {
    PRICE_SELECTORS.iter().find_map(|css| {
        select_all(page.document, css)
            .iter()
            .find_map(|el| patterns::price_in(&element_text(el)))
    })
}

fn location(page: &Page<'_>) -> Option<String> {
    first_text(
        page.document,
        &[
            "[data-test-id=\"city\"]",
            ".object-header__subtitle",
            ".object-header__location",
        ],
    )
    .map(|text| patterns::city_in(&text).unwrap_or(text))
}

fn property_type(page: &Page<'_>) -> Option<String> {
    labeled_value(page.document, LABELS, &["Soort", "Type"])
        .and_then(|v| patterns::property_type_in(&v))
}

fn surface(page: &Page<'_>) -> Option<String> {
    labeled_value(
        page.document,
        LABELS,
        &["Woonoppervlakte", "Gebruiksoppervlakte wonen", "Wonen"],
    )
    .and_then(|v| patterns::surface_in(&v))
}

fn rooms(page: &Page<'_>) -> Option<String> {
    labeled_value(page.document, LABELS, &["Aantal kamers", "Kamers"])
        .and_then(|v| patterns::rooms_in(&v))
}

fn year_built(page: &Page<'_>) -> Option<String> {
    labeled_value(page.document, LABELS, &["Bouwjaar"]).and_then(|v| patterns::year_in(&v))
}

/// Dedicated description container, if its text has prose length.
pub(super) fn description_in(page: &Page<'_>, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        select_all(page.document, css)
            .first()
            .map(element_text)
            .filter(|text| (51..2_000).contains(&char_len(text)))
    })
}

fn description(page: &Page<'_>) -> Option<String> {
    description_in(page, DESCRIPTION_SELECTORS)
}

pub static STRATEGY: SiteStrategy = SiteStrategy {
    source: Source::Funda,
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
    feature_labels: LABELS,
};

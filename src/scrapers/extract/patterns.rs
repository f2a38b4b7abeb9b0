//! Keyword scans over the whole document plus the regexes that pull a
//! field's value out of matching text. Shared by every site strategy.

use super::cascade::Page;
use super::text::{
    char_len, collapse_whitespace, element_text, is_meaningful, next_element, parent_element,
    select_all, short_elements, strip_chrome, title_case,
};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

static PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)€\s*\d[\d.,]*\s*(?:k\.k\.|v\.o\.n\.|kosten\s+koper|vrij\s+op\s+naam|per\s+maand|/\s*maand|p\.m\.)",
    )
    .expect("price regex")
});

static ROOMS_WITH_BEDROOMS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d+\s*kamers?\s*\(\d+\s*slaapkamers?\)").expect("rooms regex")
});
static ROOMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\d+\s*kamers?\b").expect("rooms regex"));
static BEDROOMS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+\s*slaapkamers?").expect("bedrooms regex"));

static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:1[89]\d{2}|20[0-2]\d)\b").expect("year regex"));

static SURFACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d[\d.,]*\s*m(?:²|2)(?:\s*(?:wonen|woonoppervlakte))?").expect("surface regex")
});

static PROPERTY_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:eengezinswoning|2-onder-1-kapwoning|tussenwoning|hoekwoning|vrijstaande\s+woning|appartement|penthouse|villa|studio|woning|huis)\b",
    )
    .expect("property type regex")
});

/// `Teststraat 1, 3511 AB Utrecht` with optional comma
static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\p{Lu}[\p{L}.'\-]*(?:\s+[\p{L}.'\-]+)*\s+\d+[\p{L}\d\-]*)\s*,?\s+(\d{4}\s?[A-Z]{2})\s+(\p{Lu}[\p{L}\-]*(?:\s+\p{Lu}[\p{L}\-]*)*)",
    )
    .expect("address regex")
});

static POSTCODE_CITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{4}\s?[A-Z]{2}\s+(\p{Lu}[\p{L}\-]*(?:\s+\p{Lu}[\p{L}\-]*)*)")
        .expect("postcode regex")
});

const TYPE_LABELS: &[&str] = &[
    "Soort woonhuis",
    "Soort appartement",
    "Soort object",
    "Soort bouw",
];

const NAVIGATION: &[&str] = &["Ga naar", "Zoek een"];

pub fn price_in(text: &str) -> Option<String> {
    PRICE.find(text).map(|m| collapse_whitespace(m.as_str()))
}

/// `5 kamers (3 slaapkamers)` beats `5 kamers` beats `3 slaapkamers`.
pub fn rooms_in(text: &str) -> Option<String> {
    [&*ROOMS_WITH_BEDROOMS, &*ROOMS, &*BEDROOMS]
        .iter()
        .find_map(|re| re.find(text))
        .map(|m| collapse_whitespace(m.as_str()))
}

pub fn year_in(text: &str) -> Option<String> {
    YEAR.find(text).map(|m| m.as_str().to_string())
}

pub fn surface_in(text: &str) -> Option<String> {
    SURFACE.find(text).map(|m| collapse_whitespace(m.as_str()))
}

pub fn property_type_in(text: &str) -> Option<String> {
    PROPERTY_TYPE.find(text).map(|m| collapse_whitespace(m.as_str()))
}

pub fn address_in(text: &str) -> Option<String> {
    ADDRESS
        .captures(text)
        .map(|c| format!("{}, {} {}", collapse_whitespace(&c[1]), &c[2], &c[3]))
}

pub fn city_in(text: &str) -> Option<String> {
    POSTCODE_CITY.captures(text).map(|c| c[1].to_string())
}

fn is_navigation(text: &str) -> bool {
    NAVIGATION.iter().any(|n| text.contains(n))
}

fn page_title(page: &Page<'_>) -> Option<String> {
    select_all(page.document, "title")
        .first()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

/// Runs `find` on the element, then its next sibling, then its parent.
fn near<'a>(element: &ElementRef<'a>, find: fn(&str) -> Option<String>) -> Option<String> {
    find(&element_text(element))
        .or_else(|| next_element(element).and_then(|el| find(&element_text(&el))))
        .or_else(|| parent_element(element).and_then(|el| find(&element_text(&el))))
}

pub fn title_tag(page: &Page<'_>) -> Option<String> {
    page_title(page)
        .map(|t| strip_chrome(&t))
        .filter(|t| is_meaningful(t))
}

pub fn price(page: &Page<'_>) -> Option<String> {
    short_elements(page.document, 100, |t| t.contains('€'))
        .into_iter()
        .find_map(|(_, text)| price_in(&text))
}

pub fn rooms(page: &Page<'_>) -> Option<String> {
    short_elements(page.document, 500, |t| {
        char_len(t) > 5 && t.to_lowercase().contains("kamer") && !is_navigation(t)
    })
    .into_iter()
    .find_map(|(_, text)| rooms_in(&text))
}

pub fn surface(page: &Page<'_>) -> Option<String> {
    short_elements(page.document, 500, |t| {
        let lower = t.to_lowercase();
        char_len(t) > 5
            && (lower.contains("m²") || lower.contains("m2") || lower.contains("oppervlakte"))
            && !is_navigation(t)
    })
    .into_iter()
    .find_map(|(_, text)| surface_in(&text))
}

pub fn year_built(page: &Page<'_>) -> Option<String> {
    short_elements(page.document, 50, |t| t.to_lowercase().contains("bouwjaar"))
        .into_iter()
        .find_map(|(el, _)| near(&el, year_in))
}

pub fn property_type(page: &Page<'_>) -> Option<String> {
    short_elements(page.document, 100, |t| {
        TYPE_LABELS.iter().any(|label| t.contains(label))
    })
    .into_iter()
    .find_map(|(el, _)| near(&el, property_type_in))
}

/// Street, postcode and city in the `<title>`, else in any short element.
pub fn address(page: &Page<'_>) -> Option<String> {
    page_title(page).and_then(|t| address_in(&t)).or_else(|| {
        short_elements(page.document, 100, |t| !is_navigation(t))
            .into_iter()
            .find_map(|(_, text)| address_in(&text))
    })
}

pub fn location(page: &Page<'_>) -> Option<String> {
    page_title(page).and_then(|t| city_in(&t)).or_else(|| {
        short_elements(page.document, 100, |t| !is_navigation(t))
            .into_iter()
            .find_map(|(_, text)| city_in(&text))
    })
}

/// Last resort: `/koop/utrecht/huis-12345678-teststraat-1/` -> `Teststraat 1, Utrecht`.
pub fn address_from_url(page: &Page<'_>) -> Option<String> {
    let tokens = page.url.path_tokens()?;
    let street = title_case(&tokens.street);
    let area = title_case(&tokens.area);
    match (street.is_empty(), area.is_empty()) {
        (false, false) => Some(format!("{}, {}", street, area)),
        (false, true) => Some(street),
        (true, false) => Some(area),
        (true, true) => None,
    }
}

/// First paragraph-like block of prose length that isn't a price, room
/// count or surface fragment.
pub fn description(page: &Page<'_>) -> Option<String> {
    select_all(page.document, "p, div")
        .into_iter()
        .map(|el| element_text(&el))
        .find(|text| {
            let len = char_len(text);
            len > 100
                && len < 2_000
                && !is_navigation(text)
                && !text.contains('€')
                && !text.contains("kamers")
                && !text.contains("m²")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_keeps_suffix_verbatim() {
        assert_eq!(price_in("Vraagprijs € 450.000 k.k.").as_deref(), Some("€ 450.000 k.k."));
        assert_eq!(
            price_in("€\u{a0}1.250.000   kosten koper").as_deref(),
            Some("€ 1.250.000 kosten koper")
        );
        assert_eq!(price_in("€ 1.650 per maand").as_deref(), Some("€ 1.650 per maand"));
        assert_eq!(price_in("€ 450.000"), None);
    }

    #[test]
    fn test_rooms_prefers_bedroom_breakdown() {
        assert_eq!(
            rooms_in("Aantal kamers 5 kamers (3 slaapkamers)").as_deref(),
            Some("5 kamers (3 slaapkamers)")
        );
        assert_eq!(rooms_in("4 kamers").as_deref(), Some("4 kamers"));
        assert_eq!(rooms_in("2 slaapkamers").as_deref(), Some("2 slaapkamers"));
        assert_eq!(rooms_in("ruime kamers"), None);
    }

    #[test]
    fn test_year_range() {
        assert_eq!(year_in("Bouwjaar 1932").as_deref(), Some("1932"));
        assert_eq!(year_in("Bouwjaar 2024").as_deref(), Some("2024"));
        assert_eq!(year_in("Bouwjaar 1750"), None);
        assert_eq!(year_in("Bouwjaar 2031"), None);
    }

    #[test]
    fn test_surface_requires_unit() {
        assert_eq!(surface_in("Wonen 120 m²").as_deref(), Some("120 m²"));
        assert_eq!(surface_in("85m2").as_deref(), Some("85m2"));
        assert_eq!(surface_in("120 kamers"), None);
    }

    #[test]
    fn test_property_type_words() {
        assert_eq!(
            property_type_in("Soort woonhuis Eengezinswoning, tussenwoning").as_deref(),
            Some("Eengezinswoning")
        );
        assert_eq!(property_type_in("Soort woonhuis"), None);
    }

    #[test]
    fn test_address_and_city() {
        let title = "Huis te koop: Teststraat 12 3511 AB Utrecht [funda]";
        assert_eq!(
            address_in(title).as_deref(),
            Some("Teststraat 12, 3511 AB Utrecht")
        );
        assert_eq!(city_in("3956 XX Leersum").as_deref(), Some("Leersum"));
    }
}

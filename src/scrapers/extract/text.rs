use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Skip-link and navigation fragments that leak into headings.
static PAGE_CHROME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)naar hoofdinhoud|hoofdinhoud|ga naar\w*|skip to(?: main)?(?: content)?")
        .expect("chrome regex")
});

pub fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(e) => {
            warn!("Invalid selector {}: {:?}", css, e);
            Vec::new()
        }
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Element text with text nodes space-separated and whitespace collapsed.
pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn strip_chrome(text: &str) -> String {
    collapse_whitespace(&PAGE_CHROME.replace_all(text, " "))
}

/// More than two characters and not just digits.
pub fn is_meaningful(text: &str) -> bool {
    char_len(text) > 2 && !text.chars().all(|c| c.is_ascii_digit() || c.is_whitespace())
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// `den-haag` -> `Den Haag`
pub fn title_case(slug: &str) -> String {
    slug.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cleaned text of the first element matching any selector, in selector order.
pub fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        select_all(document, css)
            .first()
            .map(|el| strip_chrome(&element_text(el)))
            .filter(|text| is_meaningful(text))
    })
}

pub fn next_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

pub fn parent_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}

/// Every element, in document order, whose collapsed text is shorter than
/// `max_chars` and satisfies `keep`.
pub fn short_elements<'a>(
    document: &'a Html,
    max_chars: usize,
    keep: impl Fn(&str) -> bool,
) -> Vec<(ElementRef<'a>, String)> {
    select_all(document, "*")
        .into_iter()
        .filter_map(|el| {
            let text = element_text(&el);
            (char_len(&text) < max_chars && keep(&text)).then_some((el, text))
        })
        .collect()
}

/// Text of the element following the first label (matched by `label_css`)
/// whose text contains one of `labels`, case-insensitively.
pub fn labeled_value(document: &Html, label_css: &str, labels: &[&str]) -> Option<String> {
    select_all(document, label_css).into_iter().find_map(|label_el| {
        let label = element_text(&label_el).to_lowercase();
        if !labels.iter().any(|l| label.contains(&l.to_lowercase())) {
            return None;
        }
        next_element(&label_el)
            .map(|value| element_text(&value))
            .filter(|text| !text.is_empty())
    })
}

/// `"label: value"` for every label element that has a non-empty neighbour.
pub fn label_value_pairs(document: &Html, label_css: &str) -> Vec<String> {
    select_all(document, label_css)
        .into_iter()
        .filter_map(|label_el| {
            let label = element_text(&label_el);
            let value = next_element(&label_el).map(|v| element_text(&v))?;
            (!label.is_empty() && !value.is_empty()).then(|| format!("{}: {}", label, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_chrome() {
        assert_eq!(strip_chrome("Ga naar hoofdinhoud Teststraat 1"), "Teststraat 1");
        assert_eq!(strip_chrome("Skip to content  Teststraat\n 1"), "Teststraat 1");
        assert_eq!(strip_chrome("Naar hoofdinhoud"), "");
    }

    #[test]
    fn test_is_meaningful() {
        assert!(is_meaningful("Teststraat 1"));
        assert!(!is_meaningful("12 34"));
        assert!(!is_meaningful("ab"));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("teststraat-1"), "Teststraat 1");
        assert_eq!(title_case("den-haag"), "Den Haag");
        assert_eq!(title_case("ëxtra--weg"), "Ëxtra Weg");
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("€€€€", 2), "€€");
        assert_eq!(truncate_chars("kort", 10), "kort");
    }

    #[test]
    fn test_element_text_separates_nodes() {
        let document = Html::parse_document("<dl><dt>Bouwjaar</dt><dd>1995</dd></dl>");
        let dl = select_all(&document, "dl").remove(0);
        assert_eq!(element_text(&dl), "Bouwjaar 1995");
    }

    #[test]
    fn test_labeled_value() {
        let document = Html::parse_document(
            "<dl><dt>Soort woonhuis</dt><dd> Eengezinswoning </dd><dt>Bouwjaar</dt><dd>1995</dd></dl>",
        );
        assert_eq!(
            labeled_value(&document, "dt", &["bouwjaar"]).as_deref(),
            Some("1995")
        );
        assert_eq!(
            labeled_value(&document, "dt", &["Soort"]).as_deref(),
            Some("Eengezinswoning")
        );
        assert_eq!(labeled_value(&document, "dt", &["Inhoud"]), None);
    }

    #[test]
    fn test_label_value_pairs_skip_empty_values() {
        let document = Html::parse_document(
            "<dl><dt>Bouwjaar</dt><dd>1995</dd><dt>Isolatie</dt><dd> </dd><dt>Tuin</dt><dd>Achtertuin</dd></dl>",
        );
        assert_eq!(
            label_value_pairs(&document, "dt"),
            vec!["Bouwjaar: 1995".to_string(), "Tuin: Achtertuin".to_string()]
        );
    }

    #[test]
    fn test_invalid_selector_yields_nothing() {
        let document = Html::parse_document("<p>x</p>");
        assert!(select_all(&document, "p[").is_empty());
    }
}

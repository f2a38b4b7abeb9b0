use crate::config::ScrapeConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("title regex"));

/// Verdict on a raw response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Ok,
    BotDetected(String),
}

/// Looks for block-page signatures in raw HTML, before any parsing.
#[derive(Debug, Clone)]
pub struct BotDetector {
    markers: Vec<String>,
    min_html_length: usize,
}

impl Default for BotDetector {
    fn default() -> Self {
        Self::from_config(&ScrapeConfig::default())
    }
}

impl BotDetector {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            markers: config
                .bot_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            min_html_length: config.min_html_length,
        }
    }

    /// First marker (in list order) found in the lower-cased body wins.
    ///
    /// A short body is only logged: block pages tend to be tiny, but so are
    /// some legitimate responses.
    pub fn classify(&self, html: &str, url: &str) -> Classification {
        let lower = html.to_lowercase();
        if let Some(marker) = self.markers.iter().find(|m| lower.contains(m.as_str())) {
            return Classification::BotDetected(marker.clone());
        }

        if self.is_suspiciously_short(html) {
            warn!(
                url,
                length = html.len(),
                preview = %preview(html, 500),
                "Suspiciously short HTML response"
            );
        }

        let title = TITLE_TAG
            .captures(html)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_else(|| "No title found".to_string());
        debug!(
            url,
            length = html.len(),
            title = %title,
            has_object_header = html.contains("object-header"),
            has_detail_address = html.contains("detail-address"),
            has_kenmerken = html.contains("kenmerken"),
            "HTML analysis"
        );

        Classification::Ok
    }

    pub fn is_suspiciously_short(&self, html: &str) -> bool {
        html.len() < self.min_html_length
    }
}

fn preview(html: &str, max_chars: usize) -> String {
    html.chars().take(max_chars).collect()
}

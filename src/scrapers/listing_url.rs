use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use url::Url;

/// `[/<locale>]/koop/<area>/<kind>-<8 digit id>-<street slug>/`
static CLASSIC_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:/[a-z]{2})?/(?:koop|huur)/([^/]+)/(?:huis|appartement|woning|studio|kamer|penthouse)-(\d{8})-([^/]*)")
        .expect("classic path regex")
});

/// `[/<locale>]/detail/koop/<area>/<slug>/<8 digit id>/`
static DETAIL_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:/[a-z]{2})?/detail/(?:koop|huur)/([^/]+)/([^/]+)/(\d{8})/?$").expect("detail path regex")
});

static KIND_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:huis|appartement|woning|studio|kamer|penthouse)-").expect("kind prefix regex")
});

/// Which of the supported path shapes a listing URL uses
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UrlKind {
    Classic,
    Detail,
}

/// Area and street slug recovered from the listing path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTokens {
    pub area: String,
    pub street: String,
}

/// A listing URL that passed validation. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingUrl {
    url: Url,
    id: String,
    kind: UrlKind,
}

impl ListingUrl {
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> UrlKind {
        self.kind
    }

    /// `https://<host>/`, used as the referer of outgoing requests.
    pub fn origin(&self) -> String {
        format!("{}://{}/", self.url.scheme(), self.host())
    }

    pub fn path_tokens(&self) -> Option<PathTokens> {
        let path = self.url.path();
        if let Some(caps) = CLASSIC_PATH.captures(path) {
            return Some(PathTokens {
                area: caps[1].to_string(),
                street: caps[3].to_string(),
            });
        }
        DETAIL_PATH.captures(path).map(|caps| PathTokens {
            area: caps[1].to_string(),
            street: KIND_PREFIX.replace(&caps[2], "").into_owned(),
        })
    }
}

impl fmt::Display for ListingUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Recognizes and canonicalizes listing URLs of the allow-listed sites.
#[derive(Debug, Clone)]
pub struct ListingUrlRules {
    primary_domain: String,
    allowed_hosts: Vec<String>,
    max_length: usize,
}

impl Default for ListingUrlRules {
    fn default() -> Self {
        Self::from_config(&ScrapeConfig::default())
    }
}

impl ListingUrlRules {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            primary_domain: config.primary_domain.to_ascii_lowercase(),
            allowed_hosts: config
                .sites
                .iter()
                .map(|site| site.domain.to_ascii_lowercase())
                .collect(),
            max_length: config.max_url_length,
        }
    }

    /// Best-effort repair: adds `https://` and the primary domain's `www.`.
    /// Never fails; anything else comes back with at most a scheme prepended.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let lower = trimmed.to_ascii_lowercase();
        let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let Ok(mut url) = Url::parse(&with_scheme) else {
            return with_scheme;
        };
        if url.host_str() != Some(self.primary_domain.as_str()) {
            return with_scheme;
        }
        let canonical = format!("www.{}", self.primary_domain);
        if url.set_host(Some(&canonical)).is_err() {
            return with_scheme;
        }
        url.to_string()
    }

    pub fn validate(&self, raw: &str) -> bool {
        self.parse(raw).is_ok()
    }

    /// Validates without normalizing first.
    pub fn parse(&self, raw: &str) -> Result<ListingUrl> {
        if raw.is_empty() || raw.len() > self.max_length {
            return Err(ScrapeError::InvalidUrl(format!(
                "URL must be between 1 and {} characters",
                self.max_length
            )));
        }

        let url = Url::parse(raw).map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScrapeError::InvalidUrl(format!(
                "unsupported scheme {}",
                url.scheme()
            )));
        }

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if !self.allowed_hosts.iter().any(|allowed| *allowed == host) {
            return Err(ScrapeError::UnsupportedDomain(host));
        }

        let path = url.path();
        let (kind, id) = if let Some(caps) = CLASSIC_PATH.captures(path) {
            (UrlKind::Classic, caps[2].to_string())
        } else if let Some(caps) = DETAIL_PATH.captures(path) {
            (UrlKind::Detail, caps[3].to_string())
        } else {
            return Err(ScrapeError::InvalidUrl(format!(
                "{} is not a listing page",
                path
            )));
        };

        Ok(ListingUrl { url, id, kind })
    }

    pub fn extract_id(&self, raw: &str) -> Option<String> {
        self.parse(raw).ok().map(|listing| listing.id)
    }

    pub fn url_kind(&self, raw: &str) -> Option<UrlKind> {
        self.parse(raw).ok().map(|listing| listing.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC: &str = "https://www.funda.nl/koop/amsterdam/huis-12345678-keizersgracht-1/";
    const DETAIL: &str = "https://www.funda.nl/detail/koop/deil/huis-appeldijk-5/12345678/";

    fn rules() -> ListingUrlRules {
        ListingUrlRules::default()
    }

    #[test]
    fn test_accepts_supported_shapes() {
        let rules = rules();
        for url in [
            CLASSIC,
            DETAIL,
            "https://www.funda.nl/huur/rotterdam/appartement-87654321-coolsingel-10/",
            "https://funda.nl/koop/den-haag/penthouse-11111111-lange-voorhout-2/",
            "https://www.funda.nl/koop/utrecht/kamer-22222222-oudegracht-9/",
            "https://www.funda.nl/detail/huur/leiden/mooie-woning/33333333",
            "https://www.jaap.nl/koop/zwolle/woning-44444444-diezerstraat-3/",
            "https://www.funda.nl/en/koop/amsterdam/huis-12345678-keizersgracht-1/",
            "https://www.funda.nl/en/detail/koop/deil/huis-appeldijk-5/43956018/",
        ] {
            assert!(rules.validate(url), "{} should be valid", url);
        }
    }

    #[test]
    fn test_rejects_foreign_and_malformed() {
        let rules = rules();
        for url in [
            "https://evil.example.com/koop/utrecht/huis-12345678-teststraat-1/",
            "https://evil.funda.nl/koop/utrecht/huis-12345678-teststraat-1/",
            "https://www.funda.nl/koop/utrecht/",
            "https://www.funda.nl/koop/utrecht/huis-1234-teststraat-1/",
            "https://www.funda.nl/koop/utrecht/kasteel-12345678-teststraat-1/",
            "https://www.funda.nl/english/koop/utrecht/huis-12345678-teststraat-1/",
            "https://www.funda.nl/zoeken/koop/utrecht/huis-12345678-teststraat-1/",
            "ftp://www.funda.nl/koop/utrecht/huis-12345678-teststraat-1/",
            "not a url",
            "",
        ] {
            assert!(!rules.validate(url), "{} should be invalid", url);
        }
    }

    #[test]
    fn test_disallowed_host_is_unsupported_domain() {
        let err = rules()
            .parse("https://evil.example.com/koop/utrecht/huis-12345678-teststraat-1/")
            .unwrap_err();
        assert_eq!(err, ScrapeError::UnsupportedDomain("evil.example.com".into()));
    }

    #[test]
    fn test_rejects_overlong_url() {
        let long = format!("{}{}", CLASSIC, "a".repeat(2_000));
        assert!(!rules().validate(&long));
    }

    #[test]
    fn test_normalize_adds_scheme_and_www() {
        let rules = rules();
        assert_eq!(
            rules.normalize("funda.nl/koop/amsterdam/huis-12345678-keizersgracht-1/"),
            CLASSIC
        );
        assert_eq!(
            rules.normalize("  http://funda.nl/koop/amsterdam/huis-12345678-keizersgracht-1/ "),
            "http://www.funda.nl/koop/amsterdam/huis-12345678-keizersgracht-1/"
        );
        assert_eq!(
            rules.normalize("www.jaap.nl/koop/zwolle/woning-44444444-diezerstraat-3/"),
            "https://www.jaap.nl/koop/zwolle/woning-44444444-diezerstraat-3/"
        );
        assert_eq!(rules.normalize(""), "");
    }

    #[test]
    fn test_normalize_leaves_other_hosts_alone() {
        let rules = rules();
        assert_eq!(rules.normalize("https://Evil.Example.com"), "https://Evil.Example.com");
        assert_eq!(
            rules.normalize("jaap.nl/koop/zwolle/woning-44444444-diezerstraat 3"),
            "https://jaap.nl/koop/zwolle/woning-44444444-diezerstraat 3"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let rules = rules();
        for raw in [
            "funda.nl/koop/amsterdam/huis-12345678-keizersgracht-1/",
            CLASSIC,
            "jaap.nl",
            "HTTPS://FUNDA.NL/Koop/",
            "::not a url::",
            "https://evil.example.com/x",
        ] {
            let once = rules.normalize(raw);
            assert_eq!(rules.normalize(&once), once, "input {:?}", raw);
        }
    }

    #[test]
    fn test_extract_id_from_both_shapes() {
        let rules = rules();
        assert_eq!(rules.extract_id(CLASSIC).as_deref(), Some("12345678"));
        assert_eq!(rules.extract_id(DETAIL).as_deref(), Some("12345678"));
        assert_eq!(
            rules
                .extract_id("https://www.funda.nl/en/koop/amsterdam/huis-12345678-keizersgracht-1/")
                .as_deref(),
            Some("12345678")
        );
        assert_eq!(
            rules
                .extract_id("https://www.funda.nl/en/detail/koop/deil/huis-appeldijk-5/43956018/")
                .as_deref(),
            Some("43956018")
        );
        assert_eq!(rules.extract_id("https://www.funda.nl/koop/"), None);
        assert_eq!(rules.extract_id("garbage"), None);
    }

    #[test]
    fn test_url_kind() {
        let rules = rules();
        assert_eq!(rules.url_kind(CLASSIC), Some(UrlKind::Classic));
        assert_eq!(rules.url_kind(DETAIL), Some(UrlKind::Detail));
        assert_eq!(rules.url_kind("https://www.funda.nl/"), None);
    }

    #[test]
    fn test_path_tokens() {
        let rules = rules();
        let classic = rules.parse(CLASSIC).unwrap();
        assert_eq!(
            classic.path_tokens(),
            Some(PathTokens {
                area: "amsterdam".into(),
                street: "keizersgracht-1".into()
            })
        );
        let detail = rules.parse(DETAIL).unwrap();
        assert_eq!(
            detail.path_tokens(),
            Some(PathTokens {
                area: "deil".into(),
                street: "appeldijk-5".into()
            })
        );
        assert_eq!(classic.origin(), "https://www.funda.nl/");

        let localized = rules
            .parse("https://www.funda.nl/en/detail/koop/deil/huis-appeldijk-5/43956018/")
            .unwrap();
        assert_eq!(localized.kind(), UrlKind::Detail);
        assert_eq!(
            localized.path_tokens(),
            Some(PathTokens {
                area: "deil".into(),
                street: "appeldijk-5".into()
            })
        );
    }
}

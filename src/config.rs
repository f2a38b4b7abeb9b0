use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "juistebod.json";

pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/119.0",
];

/// Block-page wording of the supported sites, matched against the lower-cased body.
///
/// Tied to the current copy of the listing site; a reworded interstitial slips through.
pub const DEFAULT_BOT_MARKERS: &[&str] = &[
    "we houden ons platform graag veilig",
    "verifiëren dat onze bezoekers echte mensen zijn",
    "captcha",
    "blocked",
    "helpdesk@funda.nl",
    "je bent bijna op de pagina die je zoekt",
    "anti-spam",
    "verification",
];

/// Which extraction strategy handles a site.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    Funda,
    Jaap,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SiteConfig {
    pub domain: String,
    pub extractor: ExtractorKind,
}

impl SiteConfig {
    pub fn new(domain: impl Into<String>, extractor: ExtractorKind) -> Self {
        Self {
            domain: domain.into(),
            extractor,
        }
    }
}

/// A fixed delay plus a uniformly random extra of up to `jitter_ms`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct DelayConfig {
    pub base_ms: u64,
    pub jitter_ms: u64,
}

impl DelayConfig {
    pub const fn new(base_ms: u64, jitter_ms: u64) -> Self {
        Self { base_ms, jitter_ms }
    }

    pub const fn none() -> Self {
        Self::new(0, 0)
    }
}

/// Scraper configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub retry_delay: DelayConfig,
    pub bot_detection_delay: DelayConfig,
    pub initial_delay: DelayConfig,
    pub user_agents: Vec<String>,
    /// Domain that always gets rewritten to its `www.` form.
    pub primary_domain: String,
    /// Allow-listed hostnames and the strategy that extracts them.
    pub sites: Vec<SiteConfig>,
    pub max_url_length: usize,
    pub max_description_length: usize,
    pub max_images: usize,
    pub max_features: usize,
    pub min_html_length: usize,
    pub bot_markers: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_attempts: 3,
            retry_delay: DelayConfig::new(2_000, 1_000),
            bot_detection_delay: DelayConfig::new(5_000, 2_000),
            initial_delay: DelayConfig::new(500, 1_000),
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
            primary_domain: "funda.nl".to_string(),
            sites: vec![
                SiteConfig::new("funda.nl", ExtractorKind::Funda),
                SiteConfig::new("www.funda.nl", ExtractorKind::Funda),
                SiteConfig::new("jaap.nl", ExtractorKind::Jaap),
                SiteConfig::new("www.jaap.nl", ExtractorKind::Jaap),
            ],
            max_url_length: 2_000,
            max_description_length: 1_000,
            max_images: 20,
            max_features: 50,
            min_html_length: 5_000,
            bot_markers: DEFAULT_BOT_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScrapeConfig {
    /// Config file (explicit path, else `juistebod.json` if present) layered under env vars.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// `JUISTEBOD_*` environment variables override single values.
    pub fn apply_env(&mut self) {
        if let Some(v) = env_number("JUISTEBOD_TIMEOUT_MS") {
            self.timeout_ms = v;
        }
        if let Some(v) = env_number("JUISTEBOD_MAX_ATTEMPTS") {
            self.max_attempts = v;
        }
        if let Some(v) = env_number("JUISTEBOD_RETRY_DELAY_MS") {
            self.retry_delay.base_ms = v;
        }
        if let Some(v) = env_number("JUISTEBOD_BOT_DELAY_MS") {
            self.bot_detection_delay.base_ms = v;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn extractor_for(&self, host: &str) -> Option<ExtractorKind> {
        self.sites
            .iter()
            .find(|site| site.domain.eq_ignore_ascii_case(host))
            .map(|site| site.extractor)
    }

    pub fn is_allowed_host(&self, host: &str) -> bool {
        self.extractor_for(host).is_some()
    }
}

/// Unparsable or out-of-range values are ignored with a warning.
fn env_number<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}

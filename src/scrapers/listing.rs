use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::models::{PropertyRecord, ScrapeOutcome};
use crate::scrapers::backoff::{pick_identity, Backoff};
use crate::scrapers::detection::{BotDetector, Classification};
use crate::scrapers::extract::ExtractionEngine;
use crate::scrapers::fetch::{AttemptContext, Fetcher, HttpFetcher};
use crate::scrapers::listing_url::{ListingUrl, ListingUrlRules};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Per-call overrides of the configured defaults
#[derive(Debug, Clone, Default)]
pub struct ScrapeOptions {
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u32>,
    pub retry_delay: Option<Duration>,
    /// Correlation id for logs; generated when absent.
    pub request_id: Option<String>,
}

/// Fetch, screen and extract one listing, retrying with backoff.
///
/// Holds no per-request state, so one scraper can serve concurrent calls.
/// Dropping a `scrape_listing` future aborts the in-flight request and any
/// pending backoff; nothing is returned for a cancelled scrape.
pub struct ListingScraper<F: Fetcher = HttpFetcher> {
    config: ScrapeConfig,
    rules: ListingUrlRules,
    detector: BotDetector,
    engine: ExtractionEngine,
    backoff: Backoff,
    fetcher: F,
}

impl ListingScraper<HttpFetcher> {
    pub fn new(config: ScrapeConfig) -> anyhow::Result<Self> {
        Ok(Self::with_fetcher(config, HttpFetcher::new()?))
    }
}

impl<F: Fetcher> ListingScraper<F> {
    pub fn with_fetcher(config: ScrapeConfig, fetcher: F) -> Self {
        Self {
            rules: ListingUrlRules::from_config(&config),
            detector: BotDetector::from_config(&config),
            engine: ExtractionEngine::from_config(&config),
            backoff: Backoff::from_config(&config),
            config,
            fetcher,
        }
    }

    pub fn rules(&self) -> &ListingUrlRules {
        &self.rules
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn scrape_listing(&self, url: &str, options: ScrapeOptions) -> ScrapeOutcome {
        let mut rng = StdRng::from_entropy();
        self.scrape_listing_with_rng(url, options, &mut rng).await
    }

    /// Same as [`scrape_listing`](Self::scrape_listing) with a caller-owned
    /// random source for delays and identity picks.
    pub async fn scrape_listing_with_rng<R: Rng + Send>(
        &self,
        url: &str,
        options: ScrapeOptions,
        rng: &mut R,
    ) -> ScrapeOutcome {
        let request_id = options
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let span = info_span!("scrape", request_id = %request_id, url = %url);

        self.run(url, options, request_id, rng).instrument(span).await
    }

    async fn run<R: Rng + Send>(
        &self,
        url: &str,
        options: ScrapeOptions,
        request_id: String,
        rng: &mut R,
    ) -> ScrapeOutcome {
        let started = Instant::now();

        let listing = match self.rules.parse(&self.rules.normalize(url)) {
            Ok(listing) => listing,
            Err(err) => {
                warn!(error = %err, "Rejected listing URL");
                return ScrapeOutcome::failure(&err, false, 0, started.elapsed());
            }
        };

        let max_attempts = options.max_attempts.unwrap_or(self.config.max_attempts).max(1);
        let timeout = options.timeout.unwrap_or_else(|| self.config.timeout());
        let mut backoff = self.backoff;
        if let Some(delay) = options.retry_delay {
            backoff.retry.base_ms = delay.as_millis() as u64;
        }

        info!(listing_id = listing.id(), max_attempts, "Starting scrape");
        sleep(backoff.initial_delay(rng)).await;

        let mut user_agent = pick_identity(&self.config.user_agents, rng).to_string();
        let mut attempts = 0;
        let mut bot_detected = false;

        let last_error = loop {
            attempts += 1;
            let ctx = AttemptContext {
                attempt: attempts,
                user_agent: user_agent.clone(),
                timeout,
                request_id: request_id.clone(),
            };

            let err = match self.attempt(&listing, &ctx).await {
                Ok(record) => {
                    let elapsed = started.elapsed();
                    info!(
                        attempts,
                        duration_ms = elapsed.as_millis() as u64,
                        "Scrape succeeded"
                    );
                    return ScrapeOutcome::success(record, attempts, elapsed);
                }
                Err(err) => err,
            };

            let suspected = err.suggests_bot_detection();
            if suspected {
                bot_detected = true;
                warn!(attempt = attempts, error = %err, "Bot detection suspected");
            } else {
                warn!(attempt = attempts, error = %err, "Attempt failed");
            }

            if !err.is_retryable() || attempts >= max_attempts {
                break err;
            }

            let delay = backoff.retry_delay(suspected, rng);
            info!(
                attempt = attempts,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Retrying scrape"
            );
            sleep(delay).await;
            user_agent = pick_identity(&self.config.user_agents, rng).to_string();
        };

        let elapsed = started.elapsed();
        error!(
            error = %last_error,
            attempts,
            duration_ms = elapsed.as_millis() as u64,
            "Scrape failed"
        );
        ScrapeOutcome::failure(&last_error, bot_detected, attempts, elapsed)
    }

    /// Fetch, then screen for block pages, then extract.
    /// A flagged body never reaches the parser.
    async fn attempt(&self, listing: &ListingUrl, ctx: &AttemptContext) -> Result<PropertyRecord> {
        debug!(attempt = ctx.attempt, "Attempting scrape");
        let html = self.fetcher.fetch(listing, ctx).await?;

        let verdict = self.detector.classify(&html, listing.as_str());
        if let Classification::BotDetected(marker) = verdict {
            return Err(ScrapeError::BotDetected(marker));
        }

        self.engine.extract_html(&html, listing)
    }
}

/// Anything that can scrape a listing URL into an outcome
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn scrape(&self, url: &str, options: ScrapeOptions) -> ScrapeOutcome;
}

#[async_trait]
impl<F: Fetcher> ListingSource for ListingScraper<F> {
    async fn scrape(&self, url: &str, options: ScrapeOptions) -> ScrapeOutcome {
        self.scrape_listing(url, options).await
    }
}

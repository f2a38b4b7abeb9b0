use crate::error::{Result, ScrapeError};
use crate::scrapers::listing_url::ListingUrl;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Per-attempt settings, built fresh for every try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptContext {
    /// 1-based
    pub attempt: u32,
    pub user_agent: String,
    pub timeout: Duration,
    pub request_id: String,
}

/// Retrieves the raw HTML of a listing page
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &ListingUrl, ctx: &AttemptContext) -> Result<String>;
}

/// reqwest-backed fetcher presenting a desktop browser's header set
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &ListingUrl, ctx: &AttemptContext) -> Result<String> {
        let timeout_ms = ctx.timeout.as_millis() as u64;
        let headers = browser_headers(&ctx.user_agent, &url.origin())?;

        debug!(url = %url, attempt = ctx.attempt, user_agent = %ctx.user_agent, "Fetching listing");

        let request = async {
            let response = self
                .client
                .get(url.as_str())
                .headers(headers)
                .send()
                .await
                .map_err(|e| transport_error(url, timeout_ms, e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ScrapeError::HttpStatus {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                });
            }

            response
                .text()
                .await
                .map_err(|e| transport_error(url, timeout_ms, e))
        };

        // Elapsing drops the request future, which aborts the connection.
        match tokio::time::timeout(ctx.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ScrapeError::Timeout { timeout_ms }),
        }
    }
}

fn transport_error(url: &ListingUrl, timeout_ms: u64, err: reqwest::Error) -> ScrapeError {
    if err.is_timeout() {
        ScrapeError::Timeout { timeout_ms }
    } else {
        ScrapeError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// Full header set of a Chrome navigation, with the target site as referer.
pub fn browser_headers(user_agent: &str, referer: &str) -> Result<HeaderMap> {
    let invalid = |what: &str| ScrapeError::Network {
        url: referer.to_string(),
        message: format!("invalid {} header value", what),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(user_agent).map_err(|_| invalid("user-agent"))?,
    );
    headers.insert(
        header::REFERER,
        HeaderValue::from_str(referer).map_err(|_| invalid("referer"))?,
    );

    let fixed: [(HeaderName, &'static str); 10] = [
        (
            header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        ),
        (header::ACCEPT_LANGUAGE, "nl-NL,nl;q=0.9,en-US;q=0.8,en;q=0.7"),
        (header::ACCEPT_ENCODING, "gzip, deflate, br"),
        (header::DNT, "1"),
        (header::UPGRADE_INSECURE_REQUESTS, "1"),
        (header::CACHE_CONTROL, "no-cache"),
        (header::PRAGMA, "no-cache"),
        (HeaderName::from_static("sec-fetch-dest"), "document"),
        (HeaderName::from_static("sec-fetch-mode"), "navigate"),
        (HeaderName::from_static("sec-fetch-site"), "none"),
    ];
    for (name, value) in fixed {
        headers.insert(name, HeaderValue::from_static(value));
    }

    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(
            "\"Google Chrome\";v=\"119\", \"Chromium\";v=\"119\", \"Not?A_Brand\";v=\"24\"",
        ),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static("?0"),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static("\"Windows\""),
    );

    Ok(headers)
}

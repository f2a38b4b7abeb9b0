use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything that can stop a single scrape attempt.
///
/// Per-field extraction misses are not represented here: those degrade to
/// sentinel values on the record instead of failing the attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("Invalid listing URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported domain: {0}")]
    UnsupportedDomain(String),

    #[error("Network error while fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Bot detection page detected: {0}")]
    BotDetected(String),

    #[error("Failed to parse document: {0}")]
    Parse(String),
}

impl ScrapeError {
    /// Retrying cannot fix a bad URL, an unknown site or an unparseable page.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            ScrapeError::InvalidUrl(_) | ScrapeError::UnsupportedDomain(_) | ScrapeError::Parse(_)
        )
    }

    /// Whether the failure looks like the site pushing back on automated traffic.
    pub fn suggests_bot_detection(&self) -> bool {
        match self {
            ScrapeError::BotDetected(_) => true,
            ScrapeError::HttpStatus { status, .. } => *status == 403,
            _ => false,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ScrapeError::InvalidUrl(_) => ErrorCode::InvalidUrl,
            ScrapeError::UnsupportedDomain(_) => ErrorCode::UnsupportedDomain,
            ScrapeError::Network { .. } => ErrorCode::NetworkError,
            ScrapeError::Timeout { .. } => ErrorCode::TimeoutError,
            ScrapeError::HttpStatus { .. } => ErrorCode::HttpError,
            ScrapeError::BotDetected(_) => ErrorCode::BotDetected,
            ScrapeError::Parse(_) => ErrorCode::ParseError,
        }
    }
}

/// Stable, caller-facing classification of a failed scrape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidUrl,
    UnsupportedDomain,
    NetworkError,
    TimeoutError,
    HttpError,
    BotDetected,
    ParseError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidUrl => "INVALID_URL",
            ErrorCode::UnsupportedDomain => "UNSUPPORTED_DOMAIN",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::TimeoutError => "TIMEOUT_ERROR",
            ErrorCode::HttpError => "HTTP_ERROR",
            ErrorCode::BotDetected => "BOT_DETECTED",
            ErrorCode::ParseError => "PARSE_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

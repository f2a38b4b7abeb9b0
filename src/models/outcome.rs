use super::PropertyRecord;
use crate::error::{ErrorCode, ScrapeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const BOT_DETECTED_MESSAGE: &str = "Website blocked our request (bot detection)";

/// Result of one top-level scrape request.
///
/// Same shape for success and failure; attempts and duration are always set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapeOutcome {
    pub success: bool,
    pub data: Option<PropertyRecord>,
    pub error: Option<String>,
    pub error_code: Option<ErrorCode>,
    pub duration_ms: u64,
    pub attempts: u32,
    pub timestamp: DateTime<Utc>,
}

impl ScrapeOutcome {
    pub fn success(record: PropertyRecord, attempts: u32, elapsed: Duration) -> Self {
        Self {
            success: true,
            data: Some(record),
            error: None,
            error_code: None,
            duration_ms: elapsed.as_millis() as u64,
            attempts,
            timestamp: Utc::now(),
        }
    }

    /// Failure envelope. A request that tripped bot detection on any attempt
    /// reports `BOT_DETECTED` even if a different error ended it.
    pub fn failure(
        last_error: &ScrapeError,
        bot_detected: bool,
        attempts: u32,
        elapsed: Duration,
    ) -> Self {
        let (error, code) = if bot_detected {
            (BOT_DETECTED_MESSAGE.to_string(), ErrorCode::BotDetected)
        } else {
            (last_error.to_string(), last_error.code())
        };

        Self {
            success: false,
            data: None,
            error: Some(error),
            error_code: Some(code),
            duration_ms: elapsed.as_millis() as u64,
            attempts,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_record;

    #[test]
    fn test_success_envelope() {
        let outcome = ScrapeOutcome::success(sample_record(), 2, Duration::from_millis(1_250));
        assert!(outcome.success);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.duration_ms, 1_250);
        assert!(outcome.error.is_none());
        assert!(outcome.error_code.is_none());
    }

    #[test]
    fn test_failure_uses_last_error() {
        let err = ScrapeError::Timeout { timeout_ms: 30_000 };
        let outcome = ScrapeOutcome::failure(&err, false, 3, Duration::from_secs(95));
        assert!(!outcome.success);
        assert!(outcome.data.is_none());
        assert_eq!(outcome.error_code, Some(ErrorCode::TimeoutError));
        assert_eq!(outcome.error.as_deref(), Some("Request timed out after 30000ms"));
    }

    #[test]
    fn test_bot_detection_is_sticky() {
        let err = ScrapeError::Network {
            url: "https://www.funda.nl/".into(),
            message: "connection reset".into(),
        };
        let outcome = ScrapeOutcome::failure(&err, true, 3, Duration::from_secs(20));
        assert_eq!(outcome.error_code, Some(ErrorCode::BotDetected));
        assert_eq!(outcome.error.as_deref(), Some(BOT_DETECTED_MESSAGE));
    }

    #[test]
    fn test_serialized_shape() {
        let err = ScrapeError::InvalidUrl("nope".into());
        let outcome = ScrapeOutcome::failure(&err, false, 0, Duration::ZERO);
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["error_code"], "INVALID_URL");
        assert_eq!(value["attempts"], 0);
        assert!(value["data"].is_null());
    }
}

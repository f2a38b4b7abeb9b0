use crate::config::{DelayConfig, ScrapeConfig};
use rand::Rng;
use std::time::Duration;

/// Randomized waits between attempts. The random source is passed in so
/// callers can seed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: DelayConfig,
    pub retry: DelayConfig,
    pub bot_detected: DelayConfig,
}

impl Backoff {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            initial: config.initial_delay,
            retry: config.retry_delay,
            bot_detected: config.bot_detection_delay,
        }
    }

    /// Zero waits everywhere.
    pub fn none() -> Self {
        Self {
            initial: DelayConfig::none(),
            retry: DelayConfig::none(),
            bot_detected: DelayConfig::none(),
        }
    }

    /// Human-like pause before the first request.
    pub fn initial_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        jittered(self.initial, rng)
    }

    /// Wait before the next attempt; a suspected block gets the longer delay.
    pub fn retry_delay<R: Rng + ?Sized>(&self, bot_suspected: bool, rng: &mut R) -> Duration {
        if bot_suspected {
            jittered(self.bot_detected, rng)
        } else {
            jittered(self.retry, rng)
        }
    }
}

fn jittered<R: Rng + ?Sized>(delay: DelayConfig, rng: &mut R) -> Duration {
    let extra = if delay.jitter_ms == 0 {
        0
    } else {
        rng.gen_range(0..=delay.jitter_ms)
    };
    Duration::from_millis(delay.base_ms.saturating_add(extra))
}

/// Picks the user agent for an attempt.
pub fn pick_identity<'a, R: Rng + ?Sized>(pool: &'a [String], rng: &mut R) -> &'a str {
    if pool.is_empty() {
        return crate::config::DEFAULT_USER_AGENTS[0];
    }
    &pool[rng.gen_range(0..pool.len())]
}

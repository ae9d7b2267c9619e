use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::config::RetryConfig;

const BACKOFF_MAX: Duration = Duration::from_secs(120);

/// Statuses that become retryable when they carry a `Retry-After` header.
const RETRY_AFTER_STATUSES: [u16; 3] = [413, 429, 503];

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_factor: f64,
    status_forcelist: Vec<u16>,
}

impl RetryPolicy {
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub const fn is_enabled(&self) -> bool {
        self.max_retries > 0
    }

    /// Whether a response with `status` should be retried, budget permitting.
    pub fn is_retryable(&self, status: StatusCode, has_retry_after: bool) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let code = status.as_u16();
        self.status_forcelist.contains(&code)
            || (has_retry_after && RETRY_AFTER_STATUSES.contains(&code))
    }

    /// Sleep before the next attempt, given how many attempts have failed in a
    /// row so far. The first retry goes out immediately.
    pub fn backoff(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures <= 1 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(consecutive_failures - 1).unwrap_or(i32::MAX);
        let secs = self.backoff_factor * 2f64.powi(exponent);
        if !secs.is_finite() || secs >= BACKOFF_MAX.as_secs_f64() {
            return BACKOFF_MAX;
        }
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// `Retry-After` on any retried response takes precedence over the
    /// computed backoff.
    pub fn delay(&self, consecutive_failures: u32, headers: &HeaderMap) -> Duration {
        retry_after(headers).unwrap_or_else(|| self.backoff(consecutive_failures))
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_factor: config.backoff_factor,
            status_forcelist: config.status_forcelist.clone(),
        }
    }
}

/// Whole seconds only; HTTP-date values are ignored.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

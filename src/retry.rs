use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::Result;

/// Retry settings as they appear in the config file.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 200,
            max_delay_ms: 2000,
        }
    }
}

impl From<&RetryConfig> for Backoff {
    fn from(cfg: &RetryConfig) -> Self {
        Backoff::new(
            Duration::from_millis(cfg.initial_delay_ms),
            2,
            Duration::from_millis(cfg.max_delay_ms),
            cfg.max_attempts,
        )
    }
}

/// A bounded retry policy with exponential backoff.
///
/// Only errors reporting [`crate::Error::is_retryable`] are attempted again; everything else is
/// returned to the caller on first failure.
#[derive(Debug, Clone)]
pub struct Backoff {
    /// The delay before the second attempt
    pub delay: Duration,

    /// The factor the delay grows by after each retry
    pub exponent: u32,

    /// The ceiling for the delay between attempts
    pub max_delay: Duration,

    /// Total attempts, including the first one
    pub max_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::from(&RetryConfig::default())
    }
}

impl Backoff {
    pub fn new(delay: Duration, exponent: u32, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            exponent,
            max_delay,
            max_attempts: max_attempts.max(1),
        }
    }

    /// The policy to apply after one more failed attempt.
    pub fn increment(&self) -> Self {
        let delay = self
            .delay
            .checked_mul(self.exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);

        Self {
            delay,
            exponent: self.exponent,
            max_delay: self.max_delay,
            max_attempts: self.max_attempts,
        }
    }

    /// Run `call` until it succeeds, fails with a non-retryable error, or the attempt budget is
    /// spent. The last error is returned unchanged.
    pub async fn retry<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut backoff = self.clone();
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(
                        operation,
                        attempt,
                        delay = ?backoff.delay,
                        error = %e,
                        "retrying registry call"
                    );
                    tokio::time::sleep(backoff.delay).await;
                    backoff = backoff.increment();
                    attempt += 1;
                }
                Err(e) => {
                    if attempt > 1 {
                        tracing::warn!(operation, attempt, error = %e, "giving up on registry call");
                    }
                    return Err(e);
                }
            }
        }
    }
}

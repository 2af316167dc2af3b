//! Bounded retry with exponential backoff for model requests

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Retry policy for transient provider failures
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Whether to retry at all
    pub enabled: bool,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,

    /// Upper bound on any single delay
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,

    /// Factor applied to the delay after each retry
    pub backoff_multiplier: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the first delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Delay to use after `current`
    fn next_delay(&self, current: Duration) -> Duration {
        if current >= self.max_delay {
            return self.max_delay;
        }
        let multiplier = f64::from(self.backoff_multiplier.max(1.0));
        Duration::from_secs_f64(current.as_secs_f64() * multiplier).min(self.max_delay)
    }
}

/// Run `operation`, retrying errors for which [`Error::is_retryable`] holds
pub async fn execute_with_retry<T, Op, Fut>(config: &RetryConfig, mut operation: Op) -> Result<T>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if !config.enabled {
        return operation().await;
    }

    let mut attempt: u32 = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < config.max_retries && error.is_retryable() => {
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Model request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = config.next_delay(delay);
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig::default().with_initial_delay(Duration::from_millis(1))
    }

    fn rate_limited() -> Error {
        Error::Api {
            status: 429,
            message: "rate limited".to_string(),
        }
    }

    #[test]
    fn test_next_delay_caps() {
        let config = RetryConfig::default();
        assert_eq!(
            config.next_delay(Duration::from_millis(250)),
            Duration::from_millis(500)
        );
        assert_eq!(config.next_delay(Duration::from_secs(4)), Duration::from_secs(5));
        assert_eq!(config.next_delay(Duration::from_secs(9)), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = execute_with_retry(&fast(), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(rate_limited())
            } else {
                Ok("ok")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let config = fast().with_max_retries(2);
        let result: Result<()> = execute_with_retry(&config, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(rate_limited())
        })
        .await;

        assert!(matches!(result, Err(Error::Api { status: 429, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_permanent_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = execute_with_retry(&fast(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Api {
                status: 401,
                message: "bad key".to_string(),
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = execute_with_retry(&RetryConfig::disabled(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(rate_limited())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

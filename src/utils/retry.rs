//! Retry utilities with exponential backoff for resilient fetches.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::transport::FetchError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Time limit for each individual attempt
    pub attempt_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    /// A single attempt with the given timeout
    pub fn no_retry(attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: 1,
            attempt_timeout,
            ..Self::default()
        }
    }

    /// Backoff before retry number `retry` (1-based)
    ///
    /// Multipliers below 1.0 or not finite are treated as 1.0.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let multiplier = if self.backoff_multiplier.is_finite() {
            self.backoff_multiplier.max(1.0)
        } else {
            1.0
        };
        let exp_delay = self.initial_delay.as_secs_f64()
            * multiplier.powf(f64::from(retry.saturating_sub(1)));
        Duration::try_from_secs_f64(exp_delay.min(self.max_delay.as_secs_f64()))
            .unwrap_or(self.max_delay)
    }
}

/// Execute an async fetch with retry logic.
///
/// Each attempt is bounded by `attempt_timeout`; a timed-out attempt counts
/// as a network error. Only transient errors (see [`FetchError::is_transient`])
/// are retried; anything else is returned immediately.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, operation: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempts = 0;
    let mut operation = operation;

    loop {
        attempts += 1;

        let error = match timeout(config.attempt_timeout, operation()).await {
            Ok(Ok(result)) => {
                if attempts > 1 {
                    tracing::info!(
                        "Fetch succeeded on attempt {} after {} transient failures",
                        attempts,
                        attempts - 1
                    );
                }
                return Ok(result);
            }
            Ok(Err(error)) => error,
            Err(_) => FetchError::Network(format!(
                "Request timed out after {:?}",
                config.attempt_timeout
            )),
        };

        if !error.is_transient() {
            return Err(error);
        }

        if attempts >= config.max_attempts {
            tracing::warn!("Fetch failed after {} attempts: {}", attempts, error);
            return Err(error);
        }

        let delay = config.delay_for(attempts);
        tracing::warn!(
            "Transient error on attempt {}: {}, retrying in {:?}",
            attempts,
            error,
            delay
        );
        sleep(delay).await;
    }
}

//! Bounded retry with exponential backoff for provider calls.
//!
//! Transient failures (transport errors, provider 429/5xx) are retried a
//! bounded number of times with growing delays; permanent failures are
//! returned immediately without another attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderFailure;

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`RetryConfig::max_delay`].
pub fn next_delay(current: Duration, config: &RetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Run `op`, retrying transient failures with exponential backoff.
///
/// Returns the first success, the first permanent failure, or the last
/// transient failure once `max_attempts` is exhausted. `label` names the
/// call in retry logs.
pub async fn with_retries<T, F, Fut>(
    config: &RetryConfig,
    label: &str,
    mut op: F,
) -> Result<T, ProviderFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderFailure>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(failure) if failure.transient && attempt < max_attempts => {
                tracing::warn!(
                    label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %failure,
                    "Transient provider failure, retrying"
                );
                tokio::time::sleep(delay).await;
                delay = next_delay(delay, config);
            }
            Err(failure) => return Err(failure),
        }
    }
}

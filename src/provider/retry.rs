//! Retry with exponential backoff around vendor network calls
//!
//! Only errors reporting `is_retryable()` are attempted again. Anything else is
//! returned on first occurrence, and the last transient error is returned
//! unchanged once attempts run out.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Result;

/// Retry configuration for network calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Wait before the second attempt
    pub initial_backoff: Duration,
    /// Maximum wait between attempts
    pub max_backoff: Duration,
    /// Growth factor applied to the wait after each failure
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(4),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget with no waiting between attempts
    pub fn without_backoff(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Wait after the given failed attempt (1-based) before trying again
    ///
    /// A multiplier below 1.0 (or NaN) is treated as 1.0.
    pub fn backoff_for(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let multiplier = self.backoff_multiplier.max(1.0);
        let scaled = self.initial_backoff.as_secs_f64() * multiplier.powi(exponent);
        Duration::try_from_secs_f64(scaled)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Run `operation` under `policy`, sleeping between transient failures
pub async fn retry_with_backoff<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;
        debug!(attempt, "Executing network call");

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(attempt, "Network call succeeded after retry");
                }
                return Ok(result);
            }
            Err(err) => {
                if !err.is_retryable() {
                    debug!(attempt, error = %err, "Error is not retryable, failing immediately");
                    return Err(err);
                }

                if attempt >= policy.max_attempts {
                    warn!(attempt, error = %err, "All retry attempts exhausted");
                    return Err(err);
                }

                let backoff = policy.backoff_for(attempt);
                warn!(
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying"
                );
                sleep(backoff).await;
            }
        }
    }
}

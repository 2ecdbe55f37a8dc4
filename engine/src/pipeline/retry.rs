//! Retry with exponential backoff
//!
//! Generic resilience wrapper for any stage that calls an external port.
//! Each call site gets its own policy; retries sleep only within their own
//! stage and never block other conversations.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Backoff policy: up to `max_retries` additional attempts, starting at
/// `initial_delay` and multiplying by `backoff_multiplier` after each one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Policy that never retries; failures surface immediately.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// The wait before retry number `retry` (1-based):
    /// `initial_delay * backoff_multiplier^(retry - 1)`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_delay
            .mul_f64(self.backoff_multiplier.powi(retry.saturating_sub(1) as i32))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
        }
    }
}

/// Run `work`, retrying per `policy`.
///
/// On each failure before the ceiling: emit a warning with the attempt
/// number, sleep the backoff delay, try again. Once `max_retries` additional
/// attempts have failed, return the final error unchanged. Generic over the
/// error type so any stage can wear it, whatever its port returns.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    stage: &str,
    mut work: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut retry = 0;
    loop {
        match work().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                retry += 1;
                if retry > policy.max_retries {
                    warn!(stage, %error, "Failed after {} retries", policy.max_retries);
                    return Err(error);
                }
                warn!(
                    stage,
                    retry,
                    max_retries = policy.max_retries,
                    %error,
                    "Retrying after error"
                );
                tokio::time::sleep(policy.delay_for(retry)).await;
            }
        }
    }
}

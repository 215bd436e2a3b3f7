// src/pipeline/retry.rs

//! Bounded retries with a fixed delay.

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Retry policy shared by both fetch strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: usize,
    /// Wait between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Single attempt, no waiting.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Run `operation`, retrying every failure.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    with_retry_if(policy, |_| true, operation).await
}

/// Run `operation`, retrying failures accepted by `should_retry`.
///
/// The last failure is returned unchanged. There is no delay after the final
/// attempt, and a rejected failure returns immediately.
pub async fn with_retry_if<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < max_attempts && should_retry(&error) => {
                log::debug!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt,
                    max_attempts,
                    error,
                    policy.delay
                );
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

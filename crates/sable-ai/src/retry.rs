//! Retry helper with exponential backoff

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Options controlling retry behavior
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Total number of attempts (including the first)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub delay: Duration,
    /// Multiplier applied to the delay after each retry
    pub backoff: f64,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            backoff: 2.0,
        }
    }
}

/// Run `f` up to `options.max_attempts` times, sleeping between attempts
/// with exponential backoff. Only retryable errors (rate limits, transport
/// failures, overload) trigger another attempt; anything else returns
/// immediately. Returns the first success or the last error.
pub async fn retry<T, F, Fut>(options: RetryOptions, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < options.max_attempts && e.is_retryable() => {
                let wait = options
                    .delay
                    .mul_f64(options.backoff.powi(attempt as i32 - 1));
                tracing::warn!(attempt, error = %e, "attempt failed, retrying in {:?}", wait);
                tokio::time::sleep(wait).await;
            }
            Err(e) => return Err(e),
        }
    }
}

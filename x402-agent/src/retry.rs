//! Exponential-backoff retry policy for fallible async operations.
//!
//! The policy holds no shared mutable state across calls, so a single
//! instance is safe to use from any number of concurrent operations.
//! Errors decide their own fate through [`RetryClass`]: client-class
//! network failures (HTTP 4xx, except 429) propagate immediately,
//! everything else is retried until attempts exhaust.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::AgentError;

/// Classification hooks an error type provides to the retry loop.
pub trait RetryClass {
    /// Returns `true` if re-attempting the operation could help.
    fn is_transient(&self) -> bool;

    /// Wraps the final error once all retries are exhausted.
    #[must_use]
    fn after_exhaustion(self, retries: u32) -> Self;
}

impl RetryClass for AgentError {
    /// Client-class (4xx) network failures are non-transient; re-attempting
    /// them is pointless. The one exception is 429: rate limiting clears on
    /// its own, so it is retried. Everything else is retried.
    fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.status_code == Some(429) || !e.is_client_error(),
            _ => true,
        }
    }

    fn after_exhaustion(self, retries: u32) -> Self {
        Self::Network(crate::error::NetworkError::new(format!(
            "Failed after {retries} retries: {self}"
        )))
    }
}

/// Exponential-backoff retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of additional attempts after the first.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor applied to the delay after each attempt.
    pub backoff_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(5000),
            backoff_multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Runs `operation` up to `max_retries + 1` times with exponential
    /// backoff between attempts.
    ///
    /// # Errors
    ///
    /// Propagates a non-transient error immediately; after exhaustion,
    /// returns the last error wrapped via [`RetryClass::after_exhaustion`].
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryClass,
    {
        let mut delay = self.initial_delay;
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_transient() {
                        return Err(err);
                    }
                    if attempt == self.max_retries {
                        return Err(err.after_exhaustion(self.max_retries));
                    }
                    attempt += 1;
                    debug!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Retrying after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * self.backoff_multiplier).min(self.max_delay);
                }
            }
        }
    }
}

//! Exponential backoff for rate-limited upstream calls.
//!
//! [`Backoff::execute`] drives an arbitrary asynchronous, fallible operation.
//! Errors the caller classifies as retryable put the task to sleep for
//! `base_delay * 2^attempt` before the next try; every other error ends the
//! loop immediately. The sleep is a `tokio` timer, so other requests keep
//! being served while one of them waits out a rate limit.
//!
//! # Example
//!
//! ```rust,ignore
//! let backoff = Backoff::default();
//! let text = backoff
//!     .execute(|| client.generate(&prompt), |e| matches!(e, Error::RateLimited))
//!     .await?;
//! ```

use std::{future::Future, time::Duration};

use thiserror::Error;
use tokio::time::sleep;

use crate::warning;

/// Outcome of an operation the executor gave up on.
#[derive(Debug, Error)]
pub enum BackoffError<E> {
    /// Every attempt was rejected with a retryable error.
    #[error("exceeded maximum retries after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// The operation failed with an error that is not worth retrying.
    #[error("{0}")]
    Aborted(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Total number of times the operation is invoked, at least one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl Backoff {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Backoff {
            max_attempts,
            base_delay,
        }
    }

    /// Delay slept after the `attempt`-th retryable failure (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }

    /// Runs `operation` until it succeeds, fails for good, or the attempt
    /// budget is spent.
    ///
    /// `is_retryable` decides which errors trigger another attempt. Every
    /// retryable failure is followed by its delay, the last one included;
    /// exhausting the budget then yields [`BackoffError::Exhausted`] instead
    /// of the last error, so a still-overloaded remote is distinguishable
    /// from a rejected request.
    pub async fn execute<T, E, F, Fut, P>(
        &self,
        mut operation: F,
        is_retryable: P,
    ) -> Result<T, BackoffError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if is_retryable(&e) => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    warning!(
                        "Rate limit hit (attempt {}/{}). Backing off {} ms...",
                        attempt,
                        max_attempts,
                        delay.as_millis()
                    );
                    sleep(delay).await;

                    if attempt >= max_attempts {
                        return Err(BackoffError::Exhausted { attempts: attempt });
                    }
                }
                Err(e) => return Err(BackoffError::Aborted(e)),
            }
        }
    }
}

//! Retry with exponential backoff, aware of the monitor's connectivity.

use super::NetworkMonitor;
use crate::{debug, log};
use std::{fmt, thread, time::Duration};
use thiserror::Error;

/// How many times to retry, and the base delay between attempts.
///
/// Attempt `n` (0-based) that fails is followed by a sleep of
/// `retry_delay * 2^n`, except after the last attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Policy used for backend service calls.
    pub const SERVICE: Self = Self::new(2, Duration::from_millis(1500));

    pub const fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    pub const fn attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Sleep after the failed attempt `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.retry_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Why one attempt failed.
#[derive(Debug, Error)]
pub enum AttemptError<E> {
    /// The link stayed down for the whole offline wait
    #[error("network connection timeout")]
    Offline,

    #[error("{0}")]
    Operation(E),
}

impl<E> AttemptError<E> {
    pub fn operation(&self) -> Option<&E> {
        match self {
            Self::Offline => None,
            Self::Operation(e) => Some(e),
        }
    }
}

/// Every attempt failed.
#[derive(Debug, Error)]
#[error("operation failed after {attempts} attempts: {last}")]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last: AttemptError<E>,
}

impl NetworkMonitor {
    /// Run `op` until it succeeds or the policy is exhausted.
    ///
    /// Before each attempt, an offline link is given up to `offline_wait` to
    /// come back. Success resets the retry count; each failure increments it.
    /// Once the monitor is cancelled no further attempt starts, and the error
    /// reports the attempts actually made.
    pub fn with_network_retry<T, E, F>(
        &self,
        policy: RetryPolicy,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        E: fmt::Display,
        F: FnMut() -> Result<T, E>,
    {
        let attempts = policy.attempts();
        let mut made = 0;
        let mut last = AttemptError::Offline;

        for attempt in 0..attempts {
            if attempt > 0 && self.is_cancelled() {
                debug!("net"; "retries cancelled after {} attempts", made);
                break;
            }
            made += 1;

            let result = if self.signal_online() {
                op().map_err(AttemptError::Operation)
            } else {
                log!("net"; "retry {}: waiting for connection", attempt + 1);
                if self.wait_for_connection(self.config().offline_wait()) {
                    op().map_err(AttemptError::Operation)
                } else {
                    Err(AttemptError::Offline)
                }
            };

            match result {
                Ok(value) => {
                    self.reset_retry_count();
                    return Ok(value);
                }
                Err(e) => {
                    self.increment_retry_count();
                    log!("net"; "retry {}/{} failed: {}", attempt + 1, attempts, e);
                    last = e;
                }
            }

            if attempt < policy.max_retries && !self.is_cancelled() {
                let delay = policy.backoff(attempt);
                debug!("net"; "retrying in {}ms", delay.as_millis());
                thread::sleep(delay);
            }
        }

        Err(RetryError {
            attempts: made,
            last,
        })
    }
}

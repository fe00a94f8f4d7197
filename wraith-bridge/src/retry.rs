//! Bounded polling with an injectable sleep.
//!
//! ```text
//! for attempt in 1..=max_attempts:
//!     Ready(v)  → return v
//!     Pending   → sleep(interval) unless this was the last attempt
//!     Err(e)    → treated like Pending
//! → Exhausted
//! ```
//!
//! Both the probe and the sleep race the cancel token, so a cancelled poll
//! returns promptly and leaves no task behind.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use wraith_core::cancel::CancelToken;
use wraith_core::constants::{DEFAULT_ATTESTATION_ATTEMPTS, DEFAULT_ATTESTATION_INTERVAL_SECS};
use wraith_core::error::{Result, WraithError};
use wraith_core::traits::Sleeper;

/// How often and how long to poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between attempts
    pub interval: Duration,
    /// Attempts before giving up, including the first
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_ATTESTATION_INTERVAL_SECS),
            max_attempts: DEFAULT_ATTESTATION_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Creates the default attestation policy (15s × 12).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the pause between attempts.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the attempt budget. Zero is raised to one.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Worst-case time spent sleeping.
    pub fn budget(&self) -> Duration {
        self.interval
            .saturating_mul(self.max_attempts.saturating_sub(1))
    }
}

/// Result of a single probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Probe<T> {
    /// The awaited value is available
    Ready(T),
    /// Not yet; try again later
    Pending,
}

/// Why polling stopped without a value.
#[derive(Debug)]
pub enum PollError {
    /// Every attempt came back pending or failed
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Error of the final attempt, if it failed rather than pended
        last_error: Option<WraithError>,
    },
    /// The cancel token fired
    Cancelled {
        /// Attempts completed before cancellation
        attempts: u32,
    },
}

/// Polls `probe` under `policy` until it is ready.
///
/// `probe` receives the 1-based attempt number.
pub async fn poll_until_ready<T, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    cancel: &CancelToken,
    mut probe: F,
) -> std::result::Result<T, PollError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Probe<T>>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        if cancel.is_cancelled() {
            return Err(PollError::Cancelled {
                attempts: attempt - 1,
            });
        }

        let outcome = tokio::select! {
            outcome = probe(attempt) => outcome,
            _ = cancel.cancelled() => {
                return Err(PollError::Cancelled { attempts: attempt - 1 });
            }
        };

        match outcome {
            Ok(Probe::Ready(value)) => {
                debug!(attempt, "poll ready");
                return Ok(value);
            }
            Ok(Probe::Pending) => {
                debug!(attempt, max_attempts, "still pending");
                last_error = None;
            }
            Err(e) => {
                warn!(attempt, max_attempts, error = %e, "poll attempt failed");
                last_error = Some(e);
            }
        }

        if attempt < max_attempts {
            tokio::select! {
                _ = sleeper.sleep(policy.interval) => {}
                _ = cancel.cancelled() => {
                    return Err(PollError::Cancelled { attempts: attempt });
                }
            }
        }
    }

    Err(PollError::Exhausted {
        attempts: max_attempts,
        last_error,
    })
}

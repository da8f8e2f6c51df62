use std::time::Duration;

use reqwest::StatusCode;

use crate::RetryConfig;

/// Result of a single attempt, as seen by the retry policy.
#[derive(Debug)]
pub enum Outcome<'a> {
    /// No response was received.
    TransportError(&'a reqwest::Error),
    /// A response arrived with this status code.
    Status(StatusCode),
}

/// What to do after an attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryDecision {
    /// Sleep for `wait`, then send the next attempt.
    Retry { wait: Duration },
    /// Finalize with the current outcome.
    Stop,
}

/// Selects how failed attempts are retried.
///
/// Only [`RetryStrategy::Default`] exists today; the enum is
/// non-exhaustive so more providers can be added without breaking callers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum RetryStrategy {
    /// Retries transport errors, status 0 and 5xx except 501, with
    /// exponential backoff clamped to the configured bounds.
    #[default]
    Default,
}

impl RetryStrategy {
    /// Decides whether the attempt numbered `attempt` (starting at 0) is
    /// followed by another one.
    pub fn should_retry(
        &self,
        outcome: &Outcome<'_>,
        attempt: usize,
        config: &RetryConfig,
    ) -> RetryDecision {
        match self {
            Self::Default => {
                let retryable = match outcome {
                    Outcome::TransportError(_) => true,
                    Outcome::Status(status) => is_retryable_status(status.as_u16()),
                };
                if !retryable || attempt >= config.max_retries {
                    return RetryDecision::Stop;
                }
                RetryDecision::Retry {
                    wait: backoff(config.min_wait, config.max_wait, attempt),
                }
            }
        }
    }
}

/// Status 0 and every 5xx except 501 Not Implemented.
pub fn is_retryable_status(status: u16) -> bool {
    status == 0 || (status >= 500 && status != 501)
}

/// `min * 2^attempt`, clamped to `[min, max]`.
pub fn backoff(min: Duration, max: Duration, attempt: usize) -> Duration {
    let exp = attempt.min(31) as u32;
    min.checked_mul(1u32 << exp)
        .unwrap_or(max)
        .clamp(min, max.max(min))
}

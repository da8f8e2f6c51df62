use std::time::Duration;

/// Environment variable holding the maximum number of retries.
pub const ENV_RETRY_MAX: &str = "HTTP_RETRY_MAX";
/// Environment variable holding the minimum backoff wait, in seconds.
pub const ENV_RETRY_WAIT_MIN: &str = "HTTP_RETRY_WAIT_MIN";
/// Environment variable holding the maximum backoff wait, in seconds.
pub const ENV_RETRY_WAIT_MAX: &str = "HTTP_RETRY_WAIT_MAX";

const DEFAULT_MAX_RETRIES: usize = 4;
const DEFAULT_MIN_WAIT: Duration = Duration::from_secs(1);
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);

/// Retry budget and backoff bounds.
///
/// Total attempts for a call are `max_retries + 1`. Waits between attempts
/// always fall within `[min_wait, max_wait]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Lower bound of the backoff wait.
    pub min_wait: Duration,
    /// Upper bound of the backoff wait.
    pub max_wait: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            min_wait: DEFAULT_MIN_WAIT,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

impl RetryConfig {
    /// Resolves the configuration from the process environment.
    ///
    /// Reads:
    /// - `HTTP_RETRY_MAX` — maximum retry count
    /// - `HTTP_RETRY_WAIT_MIN` — minimum wait in seconds
    /// - `HTTP_RETRY_WAIT_MAX` — maximum wait in seconds
    ///
    /// Missing, blank, non-numeric or non-positive values keep the defaults
    /// (4 retries, 1s, 30s). Non-numeric values are reported with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration through an arbitrary key lookup.
    ///
    /// Same rules as [`RetryConfig::from_env`]; useful when tunables come
    /// from somewhere other than the environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(max) = positive_tunable(&lookup, ENV_RETRY_MAX) {
            config.max_retries = usize::try_from(max).unwrap_or(usize::MAX);
        }
        if let Some(secs) = positive_tunable(&lookup, ENV_RETRY_WAIT_MIN) {
            config.min_wait = Duration::from_secs(secs);
        }
        if let Some(secs) = positive_tunable(&lookup, ENV_RETRY_WAIT_MAX) {
            config.max_wait = Duration::from_secs(secs);
        }

        config.normalized()
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the lower wait bound, raising `max_wait` if it falls below it.
    pub fn with_min_wait(mut self, min_wait: Duration) -> Self {
        self.min_wait = min_wait;
        self.normalized()
    }

    /// Sets the upper wait bound. A value below `min_wait` is raised to
    /// `min_wait`.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self.normalized()
    }

    /// Restores `min_wait <= max_wait` by raising `max_wait`.
    pub(crate) fn normalized(mut self) -> Self {
        if self.min_wait > self.max_wait {
            tracing::warn!(
                min_wait_ms = self.min_wait.as_millis() as u64,
                max_wait_ms = self.max_wait.as_millis() as u64,
                "minimum retry wait exceeds maximum retry wait, raising maximum"
            );
            self.max_wait = self.min_wait;
        }
        self
    }
}

/// Returns the tunable only when it parses to a value greater than zero.
fn positive_tunable<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    if raw.trim().is_empty() {
        return None;
    }

    match raw.parse::<i64>() {
        Ok(value) if value > 0 => Some(value as u64),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(
                key,
                value = %raw,
                error = %err,
                "error occurred while converting string to integer"
            );
            None
        }
    }
}

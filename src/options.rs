use std::time::Duration;

use crate::RetryConfig;

/// Default header carrying the caller's correlation identifier.
pub const DEFAULT_REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Configures retry behavior, transport timeout and log correlation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Retry budget and backoff bounds.
    pub retry: RetryConfig,
    /// Per-attempt transport timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Request header whose value is attached to retry events.
    pub request_id_header: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            timeout: None,
            request_id_header: DEFAULT_REQUEST_ID_HEADER.to_owned(),
        }
    }
}

impl ClientOptions {
    /// Default options with the retry tuning read from `HTTP_RETRY_*`.
    pub fn from_env() -> Self {
        Self {
            retry: RetryConfig::from_env(),
            ..Self::default()
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_request_id_header(mut self, header: impl Into<String>) -> Self {
        self.request_id_header = header.into();
        self
    }
}

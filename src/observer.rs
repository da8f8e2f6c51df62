use std::{fmt, time::Duration};

use reqwest::{header::HeaderMap, Url};

/// Emitted once for every attempt the policy decided to retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryEvent {
    /// Number of the attempt that failed, starting at 0.
    pub attempt: usize,
    pub method: String,
    /// Request URL with credentials removed.
    pub url: String,
    /// Status of the failed attempt, `None` when no response arrived.
    pub status: Option<u16>,
    /// Transport error text when no response arrived.
    pub error: Option<String>,
    /// Wait before the next attempt.
    pub wait: Duration,
    /// Value of the correlation header, when the caller supplied one.
    pub request_id: Option<String>,
}

/// Emitted once per call that ended with a response.
#[derive(Clone, Debug)]
pub struct ExchangeEvent<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub request_headers: &'a HeaderMap,
    pub request_body: Option<&'a [u8]>,
    pub status: u16,
    pub response_headers: &'a HeaderMap,
    pub response_body: &'a [u8],
    /// Attempts sent, including the first one.
    pub attempts: usize,
}

/// Receives retry and exchange events from [`crate::HttpClient`].
///
/// `on_retry` fires only when another attempt follows. The final attempt of
/// an exhausted budget emits no `on_retry`: a call that gets 500 on all of
/// its `max_retries + 1` attempts produces `max_retries` retry events, and
/// the last response reaches `on_exchange` instead.
///
/// Implementations must be cheap; they run inline on the request path.
pub trait RetryObserver: Send + Sync {
    fn on_retry(&self, event: &RetryEvent);

    fn on_exchange(&self, _event: &ExchangeEvent<'_>) {}
}

/// Default observer writing events through `tracing`.
///
/// Retries are logged at `warn`, completed exchanges at `debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_retry(&self, event: &RetryEvent) {
        let status = StatusField(event.status);
        match &event.request_id {
            Some(request_id) => tracing::warn!(
                request_id = %request_id,
                method = %event.method,
                url = %event.url,
                status = %status,
                attempt = event.attempt,
                wait_ms = event.wait.as_millis() as u64,
                error = event.error.as_deref(),
                "error occurred while performing http request method {} {} with status {} for attempt number {}, retrying in {:?}",
                event.method,
                event.url,
                status,
                event.attempt,
                event.wait,
            ),
            None => tracing::warn!(
                method = %event.method,
                url = %event.url,
                status = %status,
                attempt = event.attempt,
                wait_ms = event.wait.as_millis() as u64,
                error = event.error.as_deref(),
                "error occurred while performing http request method {} {} with status {} for attempt number {}, retrying in {:?}",
                event.method,
                event.url,
                status,
                event.attempt,
                event.wait,
            ),
        }
    }

    fn on_exchange(&self, event: &ExchangeEvent<'_>) {
        tracing::debug!(
            method = %event.method,
            url = %event.url,
            status = event.status,
            attempts = event.attempts,
            request_headers = ?event.request_headers,
            request_body = ?event.request_body.map(String::from_utf8_lossy),
            response_headers = ?event.response_headers,
            response_body = %String::from_utf8_lossy(event.response_body),
            "http exchange completed"
        );
    }
}

struct StatusField(Option<u16>);

impl fmt::Display for StatusField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(status) => write!(f, "{status}"),
            None => f.write_str("no response"),
        }
    }
}

/// Removes username and password from a URL before it is logged.
///
/// Strings that do not parse as URLs are returned unchanged.
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => redact(&parsed),
        Err(_) => url.to_owned(),
    }
}

pub(crate) fn redact(url: &Url) -> String {
    if url.username().is_empty() && url.password().is_none() {
        return url.to_string();
    }
    let mut redacted = url.clone();
    // Only cannot-be-a-base URLs reject these, and those carry no userinfo.
    let _ = redacted.set_username("");
    let _ = redacted.set_password(None);
    redacted.to_string()
}

use std::borrow::Cow;

use reqwest::{header::HeaderMap, StatusCode};

/// Final response of a call, with the body fully read.
///
/// When retries run out on a retryable status this is the last response
/// received, so the status must be checked before trusting the body.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Attempts sent, including the first one.
    pub attempts: usize,
}

impl HttpResponse {
    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body decoded as UTF-8, invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

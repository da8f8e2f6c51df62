//! Synchronous facade over [`crate::HttpClient`].
//!
//! The whole retry sequence, backoff sleeps included, runs on the calling
//! thread. Do not call it from inside an async runtime; use the async client
//! there instead.

use std::collections::HashMap;

use tokio::runtime::{Builder, Runtime};

use crate::{ClientOptions, HttpResponse, Result, RetryObserver, RetryStrategy};

/// Blocking variant of [`crate::HttpClient`], backed by a private
/// current-thread runtime.
#[derive(Debug)]
pub struct HttpClient {
    inner: crate::HttpClient,
    runtime: Runtime,
}

impl HttpClient {
    /// Creates a client with default options.
    pub fn new() -> Result<Self> {
        Self::with_client(crate::HttpClient::new())
    }

    /// Creates a client with the retry tuning read from the environment.
    pub fn from_env() -> Result<Self> {
        Self::with_client(crate::HttpClient::from_env())
    }

    /// Wraps an already configured async client.
    pub fn with_client(inner: crate::HttpClient) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { inner, runtime })
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.inner = self.inner.with_options(options);
        self
    }

    pub fn with_observer(mut self, observer: impl RetryObserver + 'static) -> Self {
        self.inner = self.inner.with_observer(observer);
        self
    }

    /// Blocking form of [`crate::HttpClient::perform_requests`].
    pub fn perform_requests(
        &self,
        headers: &HashMap<String, String>,
        method: &str,
        url: &str,
        payload: impl AsRef<[u8]>,
        strategy: RetryStrategy,
    ) -> Result<HttpResponse> {
        self.runtime.block_on(
            self.inner
                .perform_requests(headers, method, url, payload, strategy),
        )
    }
}

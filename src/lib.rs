//! `resilient-http` sends HTTP requests and retries transient failures.
//!
//! A call is retried when no response arrives or when the status is 0 or
//! 5xx (except 501), waiting an exponentially growing, clamped delay between
//! attempts. Tuning comes from [`RetryConfig`], usually resolved from the
//! `HTTP_RETRY_*` environment variables:
//! - [`HttpClient::perform_requests`]
//! - [`perform_requests`] for one-shot calls
//! - [`blocking::HttpClient`] for callers without an async runtime

mod client;
mod config;
mod error;
mod observer;
mod options;
mod policy;
mod types;

pub mod blocking;
pub mod logger;
pub mod tools;

pub use client::{perform_requests, HttpClient};
pub use config::{RetryConfig, ENV_RETRY_MAX, ENV_RETRY_WAIT_MAX, ENV_RETRY_WAIT_MIN};
pub use error::HttpError;
pub use observer::{redact_url, ExchangeEvent, RetryEvent, RetryObserver, TracingObserver};
pub use options::{ClientOptions, DEFAULT_REQUEST_ID_HEADER};
pub use policy::{backoff, is_retryable_status, Outcome, RetryDecision, RetryStrategy};
pub use types::HttpResponse;

pub type Result<T> = std::result::Result<T, HttpError>;

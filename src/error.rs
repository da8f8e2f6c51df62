/// Error type returned by this crate.
///
/// A response with a failing status is not an error: when retries run out on
/// a retryable status the last response is returned and callers inspect
/// [`crate::HttpResponse::status`].
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The method string is not a valid HTTP method token.
    #[error("invalid http method '{method}'")]
    InvalidMethod { method: String },
    /// A caller header has an invalid name or value.
    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },
    /// The request could not be built, typically a malformed URL.
    /// Nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(reqwest::Error),
    /// Last network or request execution error once retries are exhausted.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// The final response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(reqwest::Error),
    /// A map value cannot be flattened to a string.
    #[error("value for key '{key}' is not a scalar")]
    Convert { key: String },
    /// The blocking client could not start its runtime.
    #[error("failed to build runtime: {0}")]
    Runtime(#[from] std::io::Error),
    /// The global log subscriber could not be installed.
    #[error("logger initialization failed: {0}")]
    Logger(String),
}

use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH},
    Method, Request,
};
use tokio::time::sleep;

use crate::{
    observer::{redact, ExchangeEvent, RetryEvent, RetryObserver, TracingObserver},
    policy::{Outcome, RetryDecision, RetryStrategy},
    ClientOptions, HttpError, HttpResponse, Result,
};

/// HTTP client that retries transient failures with exponential backoff.
///
/// Cloning is cheap: clones share the connection pool and the observer.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    options: ClientOptions,
    observer: Arc<dyn RetryObserver>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a client with default options (4 retries, 1s..30s backoff).
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            options: ClientOptions::default(),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Creates a client whose retry tuning is read from `HTTP_RETRY_MAX`,
    /// `HTTP_RETRY_WAIT_MIN` and `HTTP_RETRY_WAIT_MAX`.
    ///
    /// See [`crate::RetryConfig::from_env`] for the parsing rules.
    pub fn from_env() -> Self {
        Self::new().with_options(ClientOptions::from_env())
    }

    /// Applies client options such as retry budget and timeout.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Replaces the default [`TracingObserver`].
    pub fn with_observer(mut self, observer: impl RetryObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Uses a preconfigured `reqwest::Client` for the transport.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Sends one request, retrying transport errors and retryable statuses.
    ///
    /// Body rules: `GET` never sends a body; `POST` always sends `payload`;
    /// other methods send it only when it is non-empty. Whenever a body is
    /// sent, `Content-Length` is set to its length.
    ///
    /// Returns:
    /// - `Ok` with the final response once a non-retryable status arrives,
    ///   or with the last response when retries run out on a retryable one.
    /// - `Err(HttpError::Transport)` with the last error when retries run
    ///   out without any response.
    /// - A construction error, without touching the network, when the
    ///   method, URL or headers are malformed. A blank method means `GET`.
    pub async fn perform_requests(
        &self,
        headers: &HashMap<String, String>,
        method: &str,
        url: &str,
        payload: impl AsRef<[u8]>,
        strategy: RetryStrategy,
    ) -> Result<HttpResponse> {
        let spec = RequestSpec::new(headers, method, url, payload.as_ref()).inspect_err(|err| {
            tracing::error!(error = %err, "error occurred while initializing http request");
        })?;
        let mut request = spec
            .build(&self.http, self.options.timeout)
            .map_err(|err| {
                tracing::error!(error = %err, "error occurred while initializing http request");
                HttpError::InvalidRequest(err)
            })?;

        let url = redact(request.url());
        let request_headers = request.headers().clone();
        let request_id = request_headers
            .get(self.options.request_id_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        tracing::debug!(
            method = %spec.method,
            url = %url,
            headers = ?request_headers,
            body = ?spec.body.as_deref().map(String::from_utf8_lossy),
            "sending http request"
        );

        let mut attempt = 0usize;
        loop {
            let wait = match self.http.execute(request).await {
                Ok(response) => {
                    let decision = strategy.should_retry(
                        &Outcome::Status(response.status()),
                        attempt,
                        &self.options.retry,
                    );
                    match decision {
                        RetryDecision::Stop => {
                            let response = self
                                .finish(response, &spec, &url, &request_headers, attempt + 1)
                                .await?;
                            return Ok(response);
                        }
                        RetryDecision::Retry { wait } => {
                            self.observer.on_retry(&RetryEvent {
                                attempt,
                                method: spec.method.to_string(),
                                url: url.clone(),
                                status: Some(response.status().as_u16()),
                                error: None,
                                wait,
                                request_id: request_id.clone(),
                            });
                            // Drain so the connection goes back to the pool.
                            let _ = response.bytes().await;
                            wait
                        }
                    }
                }
                Err(err) => {
                    let decision = strategy.should_retry(
                        &Outcome::TransportError(&err),
                        attempt,
                        &self.options.retry,
                    );
                    match decision {
                        RetryDecision::Stop => return Err(HttpError::Transport(err)),
                        RetryDecision::Retry { wait } => {
                            self.observer.on_retry(&RetryEvent {
                                attempt,
                                method: spec.method.to_string(),
                                url: url.clone(),
                                status: None,
                                error: Some(err.to_string()),
                                wait,
                                request_id: request_id.clone(),
                            });
                            wait
                        }
                    }
                }
            };

            sleep(wait).await;
            attempt += 1;
            request = spec
                .build(&self.http, self.options.timeout)
                .map_err(HttpError::InvalidRequest)?;
        }
    }

    async fn finish(
        &self,
        response: reqwest::Response,
        spec: &RequestSpec,
        url: &str,
        request_headers: &HeaderMap,
        attempts: usize,
    ) -> Result<HttpResponse> {
        let status = response.status();
        let headers = response.headers().clone();
        // `bytes` consumes the response, releasing it on success and failure.
        let body = response.bytes().await.map_err(HttpError::Body)?.to_vec();

        let method = spec.method.as_str();
        self.observer.on_exchange(&ExchangeEvent {
            method,
            url,
            request_headers,
            request_body: spec.body.as_deref(),
            status: status.as_u16(),
            response_headers: &headers,
            response_body: &body,
            attempts,
        });

        Ok(HttpResponse {
            status,
            headers,
            body,
            attempts,
        })
    }
}

/// Validated inputs, rebuilt into a fresh `reqwest::Request` per attempt.
struct RequestSpec {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl RequestSpec {
    fn new(
        headers: &HashMap<String, String>,
        method: &str,
        url: &str,
        payload: &[u8],
    ) -> Result<Self> {
        // A blank method means GET.
        let method = if method.trim().is_empty() {
            Method::GET
        } else {
            Method::from_bytes(method.as_bytes()).map_err(|_| HttpError::InvalidMethod {
                method: method.to_owned(),
            })?
        };

        let mut header_map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let invalid = || HttpError::InvalidHeader { name: name.clone() };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
            let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
            header_map.insert(header_name, header_value);
        }

        let body = request_body(&method, payload).map(<[u8]>::to_vec);

        Ok(Self {
            method,
            url: url.to_owned(),
            headers: header_map,
            body,
        })
    }

    fn build(&self, http: &reqwest::Client, timeout: Option<Duration>) -> reqwest::Result<Request> {
        // Malformed URLs surface as a builder error from `build`.
        let mut builder = http.request(self.method.clone(), self.url.as_str());
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }
        builder = builder.headers(self.headers.clone());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let mut request = builder.build()?;
        if let Some(body) = &self.body {
            request
                .headers_mut()
                .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }
        Ok(request)
    }
}

fn request_body<'a>(method: &Method, payload: &'a [u8]) -> Option<&'a [u8]> {
    if *method == Method::GET {
        None
    } else if *method == Method::POST || !payload.is_empty() {
        Some(payload)
    } else {
        None
    }
}

/// One-shot call with a client configured from the environment.
///
/// Prefer a shared [`HttpClient`] when issuing many requests so the
/// connection pool is reused.
pub async fn perform_requests(
    headers: &HashMap<String, String>,
    method: &str,
    url: &str,
    payload: impl AsRef<[u8]>,
    strategy: RetryStrategy,
) -> Result<HttpResponse> {
    HttpClient::from_env()
        .perform_requests(headers, method, url, payload, strategy)
        .await
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use reqwest::{header::CONTENT_LENGTH, Method};

    use super::{request_body, HttpClient, RequestSpec};
    use crate::HttpError;

    fn spec(method: &str, url: &str, payload: &str) -> RequestSpec {
        RequestSpec::new(&HashMap::new(), method, url, payload.as_bytes())
            .expect("spec must be valid")
    }

    #[test]
    fn body_rules_per_method() {
        assert_eq!(request_body(&Method::GET, b"a=b"), None);
        assert_eq!(request_body(&Method::POST, b""), Some(&b""[..]));
        assert_eq!(request_body(&Method::PUT, b""), None);
        assert_eq!(request_body(&Method::PUT, b"a=b"), Some(&b"a=b"[..]));
        assert_eq!(request_body(&Method::DELETE, b"x"), Some(&b"x"[..]));
    }

    #[test]
    fn get_request_has_no_body_or_content_length() {
        let request = spec("GET", "http://localhost/", "")
            .build(&reqwest::Client::new(), None)
            .expect("request must build");
        assert!(request.body().is_none());
        assert!(request.headers().get(CONTENT_LENGTH).is_none());
    }

    #[test]
    fn put_request_sets_content_length() {
        let request = spec("PUT", "http://localhost/", "a=b")
            .build(&reqwest::Client::new(), None)
            .expect("request must build");
        assert_eq!(
            request.body().and_then(|body| body.as_bytes()),
            Some(&b"a=b"[..])
        );
        assert_eq!(request.headers()[CONTENT_LENGTH], "3");
    }

    #[test]
    fn content_length_overrides_caller_header() {
        let headers = HashMap::from([("Content-Length".to_owned(), "99".to_owned())]);
        let request = RequestSpec::new(&headers, "POST", "http://localhost/", b"abcd")
            .and_then(|spec| {
                spec.build(&reqwest::Client::new(), None)
                    .map_err(HttpError::InvalidRequest)
            })
            .expect("request must build");
        assert_eq!(request.headers()[CONTENT_LENGTH], "4");
    }

    #[test]
    fn invalid_method_and_header_are_rejected() {
        assert!(matches!(
            RequestSpec::new(&HashMap::new(), "GE T", "http://localhost/", b""),
            Err(HttpError::InvalidMethod { .. })
        ));
        let headers = HashMap::from([("bad header".to_owned(), "v".to_owned())]);
        assert!(matches!(
            RequestSpec::new(&headers, "GET", "http://localhost/", b""),
            Err(HttpError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn blank_method_means_get() {
        for method in ["", "  "] {
            let spec = RequestSpec::new(&HashMap::new(), method, "http://localhost/", b"a=b")
                .expect("blank method must be accepted");
            assert_eq!(spec.method, Method::GET);
            assert!(spec.body.is_none());
        }
    }

    #[test]
    fn empty_url_fails_to_build() {
        let result = spec("POST", "", "").build(&reqwest::Client::new(), None);
        assert!(result.is_err_and(|err| err.is_builder()));
    }

    #[test]
    fn debug_hides_observer() {
        let debug = format!("{:?}", HttpClient::new());
        assert!(debug.contains("HttpClient"));
        assert!(debug.contains("max_retries: 4"));
    }
}

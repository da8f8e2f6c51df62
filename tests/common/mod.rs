#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::{header::CONTENT_LENGTH, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use resilient_http::{ClientOptions, ExchangeEvent, RetryConfig, RetryEvent, RetryObserver};

#[derive(Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl MockResponse {
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::from_millis(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// What the mock server saw for one request.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub content_length: Option<String>,
    pub request_id: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct MockState {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    fallback: MockResponse,
    hits: Arc<AtomicUsize>,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

async fn handler(
    State(state): State<MockState>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state
        .recorded
        .lock()
        .expect("recorded mutex must not be poisoned")
        .push(Recorded {
            method,
            content_length: header_text(&headers, CONTENT_LENGTH.as_str()),
            request_id: header_text(&headers, "x-request-id"),
            body,
        });

    let response = {
        let mut queue = state
            .responses
            .lock()
            .expect("response queue mutex must not be poisoned");
        queue.pop_front().unwrap_or_else(|| state.fallback.clone())
    };

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    (response.status, response.body)
}

fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

pub struct TestServer {
    pub base_url: String,
    pub address: std::net::SocketAddr,
    pub hits: Arc<AtomicUsize>,
    pub recorded: Arc<Mutex<Vec<Recorded>>>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TestServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded
            .lock()
            .expect("recorded mutex must not be poisoned")
            .clone()
    }
}

/// Serves `responses` in order, then `fallback` forever.
pub async fn spawn_server(responses: Vec<MockResponse>, fallback: MockResponse) -> TestServer {
    let state = MockState {
        responses: Arc::new(Mutex::new(responses.into())),
        fallback,
        hits: Arc::new(AtomicUsize::new(0)),
        recorded: Arc::new(Mutex::new(Vec::new())),
    };

    let app = Router::new()
        .route("/", any(handler))
        .route("/*path", any(handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    TestServer {
        base_url: format!("http://{address}"),
        address,
        hits: state.hits,
        recorded: state.recorded,
        task,
    }
}

/// Retry budget with millisecond waits so tests stay fast.
pub fn fast_options(max_retries: usize) -> ClientOptions {
    ClientOptions::default().with_retry(
        RetryConfig::default()
            .with_max_retries(max_retries)
            .with_min_wait(Duration::from_millis(1))
            .with_max_wait(Duration::from_millis(5)),
    )
}

/// Owned copy of an [`ExchangeEvent`].
#[derive(Clone, Debug)]
pub struct RecordedExchange {
    pub method: String,
    pub url: String,
    pub request_content_type: Option<String>,
    pub request_body: Option<Vec<u8>>,
    pub status: u16,
    pub response_body: Vec<u8>,
    pub attempts: usize,
}

#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub events: Arc<Mutex<Vec<RetryEvent>>>,
    pub exchanges: Arc<Mutex<Vec<RecordedExchange>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<RetryEvent> {
        self.events
            .lock()
            .expect("events mutex must not be poisoned")
            .clone()
    }

    pub fn exchanges(&self) -> Vec<RecordedExchange> {
        self.exchanges
            .lock()
            .expect("exchanges mutex must not be poisoned")
            .clone()
    }
}

impl RetryObserver for RecordingObserver {
    fn on_retry(&self, event: &RetryEvent) {
        self.events
            .lock()
            .expect("events mutex must not be poisoned")
            .push(event.clone());
    }

    fn on_exchange(&self, event: &ExchangeEvent<'_>) {
        self.exchanges
            .lock()
            .expect("exchanges mutex must not be poisoned")
            .push(RecordedExchange {
                method: event.method.to_owned(),
                url: event.url.to_owned(),
                request_content_type: header_text(event.request_headers, "content-type"),
                request_body: event.request_body.map(<[u8]>::to_vec),
                status: event.status,
                response_body: event.response_body.to_vec(),
                attempts: event.attempts,
            });
    }
}

//! Shared utilities for pool integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use hostpool::config::{BackoffConfig, HostConfig, PoolConfig};
use hostpool::Pool;

/// What the mock backend saw.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub body: String,
}

impl From<&Request> for MockRequest {
    fn from(req: &Request) -> Self {
        Self {
            method: req.method.to_string(),
            path: req.url.path().to_string(),
            query: req.url.query().unwrap_or_default().to_string(),
            body: String::from_utf8_lossy(&req.body).into_owned(),
        }
    }
}

/// What the mock backend answers.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub content_type: Option<String>,
    pub delay: Duration,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            content_type: None,
            delay: Duration::ZERO,
        }
    }

    pub fn json(body: impl Into<String>) -> Self {
        Self {
            content_type: Some("application/json".to_string()),
            ..Self::new(200, body)
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn into_template(self) -> ResponseTemplate {
        let mut template = ResponseTemplate::new(self.status);
        for (name, value) in &self.headers {
            template = template.insert_header(name.as_str(), value.as_str());
        }
        if !self.body.is_empty() {
            template = match &self.content_type {
                Some(mime) => template.set_body_raw(self.body.into_bytes(), mime),
                None => template.set_body_string(self.body),
            };
        }
        if !self.delay.is_zero() {
            template = template.set_delay(self.delay);
        }
        template
    }
}

/// Start a programmable mock backend on an ephemeral port.
///
/// The server lives until the test's runtime shuts down.
pub async fn start_backend<F>(handler: F) -> SocketAddr
where
    F: Fn(&MockRequest) -> MockResponse + Send + Sync + 'static,
{
    let server = MockServer::start().await;
    let addr = *server.address();

    Mock::given(any())
        .respond_with(move |req: &Request| handler(&MockRequest::from(req)).into_template())
        .mount(&server)
        .await;

    tokio::spawn(async move {
        let _server = server;
        std::future::pending::<()>().await;
    });

    addr
}

/// Start a backend that always answers with the same status and body.
pub async fn start_fixed_backend(status: u16, body: &'static str) -> SocketAddr {
    start_backend(move |_| MockResponse::new(status, body)).await
}

/// An address nothing listens on.
pub async fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Pool over the given backends with deterministic backoff.
pub fn pool_for(addrs: &[SocketAddr], initial_ms: u64) -> Pool {
    pool_with_backoff(
        addrs,
        BackoffConfig {
            initial_ms,
            jitter: 0.0,
            ..BackoffConfig::default()
        },
    )
}

/// Pool over the given backends with the given backoff.
pub fn pool_with_backoff(addrs: &[SocketAddr], backoff: BackoffConfig) -> Pool {
    let mut config = PoolConfig::default();
    config.backoff = backoff;
    config.hosts = addrs
        .iter()
        .map(|a| HostConfig::new(format!("http://{}", a)))
        .collect();
    Pool::from_config(&config).unwrap()
}

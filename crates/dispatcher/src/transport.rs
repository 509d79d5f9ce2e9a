//! Transport - one HTTP POST per attempt, over a bounded connection pool
//!
//! `Transport` is the seam between the retry loop and the network; tests swap
//! in `ScriptedTransport`, production uses `HttpTransport` (reqwest).

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use contracts::{DispatchError, ProducerConfig};

use crate::error::DispatcherError;

/// Upper bound on how much of a rejection body is kept
const MAX_BODY_CHARS: usize = 1024;

/// Producer reply to a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Producer answers 200 or 201 on acceptance
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, 200 | 201)
    }
}

/// Transport trait
///
/// Each `send` is exactly one attempt; retry policy lives in the client.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Destination, for logging
    fn endpoint(&self) -> &str;

    /// POST one serialized event
    async fn send(&self, body: Bytes) -> Result<TransportResponse, DispatchError>;

    /// Release pooled connections; later sends fail fast
    fn close(&self);
}

/// reqwest-backed transport
///
/// reqwest pools per host but has no global cap, so concurrent requests are
/// bounded by a semaphore sized `min(max_connections, max_connections_per_route)`.
/// There is a single producer route, so the per-route bound is the effective one.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    permits: Semaphore,
    /// How long an attempt may wait for a pooled connection
    acquire_timeout: Duration,
}

impl HttpTransport {
    /// Build from producer settings
    ///
    /// # Errors
    /// `TransportBuild` if the reqwest client cannot be configured.
    pub fn new(config: &ProducerConfig) -> Result<Self, DispatcherError> {
        let endpoint = config.publish_url();
        let max_in_flight = config
            .max_connections
            .min(config.max_connections_per_route)
            .max(1);

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.socket_timeout())
            .pool_max_idle_per_host(max_in_flight)
            .build()
            .map_err(|e| DispatcherError::transport_build(&endpoint, e.to_string()))?;

        info!(
            endpoint = %endpoint,
            max_in_flight,
            connect_timeout_ms = config.connect_timeout_ms,
            socket_timeout_ms = config.socket_timeout_ms,
            "HTTP transport created"
        );

        Ok(Self {
            client,
            endpoint,
            permits: Semaphore::new(max_in_flight),
            acquire_timeout: config.connect_timeout(),
        })
    }

    /// Connections currently free
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }
}

impl Transport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, body: Bytes) -> Result<TransportResponse, DispatchError> {
        let _permit = match tokio::time::timeout(self.acquire_timeout, self.permits.acquire()).await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(DispatchError::transport("transport closed")),
            Err(_) => return Err(DispatchError::transport("connection pool exhausted")),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DispatchError::transport(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    DispatchError::transport(format!("connection failed: {e}"))
                } else {
                    DispatchError::transport(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        // Drain the body so the connection can go back to the pool
        let body = match response.text().await {
            Ok(text) => truncate(text),
            Err(e) => {
                debug!(status, error = %e, "Failed to read producer response body");
                String::new()
            }
        };

        Ok(TransportResponse { status, body })
    }

    fn close(&self) {
        self.permits.close();
        debug!(endpoint = %self.endpoint, "HTTP transport closed");
    }
}

fn truncate(mut text: String) -> String {
    if let Some((idx, _)) = text.char_indices().nth(MAX_BODY_CHARS) {
        text.truncate(idx);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::{truncate, HttpTransport, Transport, TransportResponse, MAX_BODY_CHARS};
    use bytes::Bytes;
    use contracts::{DispatchError, ProducerConfig};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ProducerConfig {
        let addr = server.address();
        ProducerConfig {
            host: addr.ip().to_string(),
            port: addr.port(),
            ..ProducerConfig::default()
        }
    }

    #[test]
    fn test_accepted_statuses() {
        assert!(TransportResponse::new(200, "").is_accepted());
        assert!(TransportResponse::new(201, "").is_accepted());
        assert!(!TransportResponse::new(202, "").is_accepted());
        assert!(!TransportResponse::new(500, "").is_accepted());
    }

    #[test]
    fn test_truncate_long_body() {
        let long = "x".repeat(MAX_BODY_CHARS + 10);
        assert_eq!(truncate(long).len(), MAX_BODY_CHARS);
        assert_eq!(truncate("short".to_string()), "short");
    }

    #[tokio::test]
    async fn test_posts_json_to_publish() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/publish"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({"reviewType": "like", "albumId": "abc"})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&config_for(&server)).unwrap();
        let body = Bytes::from_static(br#"{"reviewType":"like","albumId":"abc"}"#);
        let response = transport.send(body).await.unwrap();
        assert_eq!(response.status, 201);
        assert!(response.is_accepted());
    }

    #[tokio::test]
    async fn test_rejection_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&config_for(&server)).unwrap();
        let response = transport.send(Bytes::from_static(b"{}")).await.unwrap();
        assert_eq!(response, TransportResponse::new(503, "busy"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // 绑定后立即释放，端口上不再有监听者
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let config = ProducerConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..ProducerConfig::default()
        };

        let transport = HttpTransport::new(&config).unwrap();
        let err = transport.send(Bytes::from_static(b"{}")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Transport { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_send_after_close_fails_fast() {
        let server = MockServer::start().await;
        let transport = HttpTransport::new(&config_for(&server)).unwrap();
        transport.close();

        assert!(transport.is_closed());
        let err = transport.send(Bytes::from_static(b"{}")).await.unwrap_err();
        assert_eq!(err, DispatchError::transport("transport closed"));
    }

    #[tokio::test]
    async fn test_permits_bounded_by_per_route() {
        let config = ProducerConfig {
            max_connections: 200,
            max_connections_per_route: 50,
            ..ProducerConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.available_permits(), 50);
        assert_eq!(transport.endpoint(), "http://localhost:9090/publish");
    }
}

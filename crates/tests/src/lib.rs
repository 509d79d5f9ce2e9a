//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试 (事件线格式、错误体格式)
//! - 端到端测试：HTTP API -> DispatchClient -> 模拟生产者 (wiremock)
//! - 并发与关闭行为

#[cfg(test)]
mod contract_tests {
    use contracts::{ErrorMsg, ImageMetaData, ReviewEvent, ReviewType};

    #[test]
    fn test_review_event_wire_format() {
        let event = ReviewEvent::new(ReviewType::Like, "0123456789abcdef0123");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"reviewType": "like", "albumId": "0123456789abcdef0123"})
        );
    }

    #[test]
    fn test_response_bodies() {
        assert_eq!(
            serde_json::to_value(ErrorMsg::new("Album not found")).unwrap(),
            serde_json::json!({"msg": "Album not found"})
        );
        assert_eq!(
            serde_json::to_value(ImageMetaData::new("abc", 1024)).unwrap(),
            serde_json::json!({"albumID": "abc", "imageSize": "1024"})
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use api::{build_router, AppState, InMemoryAlbumStore};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{AppConfig, DispatchError, DispatchOutcome, ReviewEvent, ReviewType};
    use dispatcher::{DispatchClient, HttpTransport, LifecycleState};

    const BOUNDARY: &str = "e2e-boundary";

    /// Config pointing at the mock producer, loaded the way the binary does
    fn config_for(server: &MockServer) -> AppConfig {
        let addr = server.address();
        let content = format!(
            r#"
[producer]
host = "{}"
port = {}
connect_timeout_ms = 1000
socket_timeout_ms = 2000

[retry]
max_attempts = 3
base_delay_ms = 10

[stats]
interval_ms = 100
shutdown_grace_ms = 1000
"#,
            addr.ip(),
            addr.port()
        );
        ConfigLoader::load_from_str(&content, ConfigFormat::Toml).unwrap()
    }

    struct Stack {
        router: Router,
        client: Arc<DispatchClient<HttpTransport>>,
    }

    fn stack(config: &AppConfig) -> Stack {
        let client = Arc::new(DispatchClient::from_config(config).unwrap());
        let store = Arc::new(InMemoryAlbumStore::new());
        let state = AppState::new(store, Arc::clone(&client), &config.server);
        Stack {
            router: build_router(state),
            client,
        }
    }

    async fn create_album(router: &Router) -> String {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"c.png\"\r\n\r\nPNGDATA\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"artist\"\r\n\r\nJoy Division\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nCloser\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"year\"\r\n\r\n1980\r\n\
             --{b}--\r\n",
            b = BOUNDARY
        );
        let request = Request::builder()
            .method("POST")
            .uri("/albums")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let meta: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        meta["albumID"].as_str().unwrap().to_string()
    }

    async fn post_review(router: &Router, review_type: &str, album_id: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri(format!("/review/{review_type}/{album_id}"))
            .body(Body::empty())
            .unwrap();
        router.clone().oneshot(request).await.unwrap().status()
    }

    /// End-to-end: album upload, review request, event lands at the producer
    #[tokio::test]
    async fn test_e2e_review_reaches_producer() {
        let producer = MockServer::start().await;
        let stack_config = config_for(&producer);
        let app = stack(&stack_config);
        let album_id = create_album(&app.router).await;

        Mock::given(method("POST"))
            .and(path("/publish"))
            .and(body_json(
                serde_json::json!({"reviewType": "dislike", "albumId": album_id}),
            ))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&producer)
            .await;

        assert_eq!(
            post_review(&app.router, "dislike", &album_id).await,
            StatusCode::CREATED
        );

        let stats = app.client.snapshot();
        assert_eq!((stats.sent, stats.succeeded, stats.failed), (1, 1, 0));
        app.client.close().await;
    }

    /// Producer fails twice, then accepts: one logical dispatch, three attempts
    #[tokio::test]
    async fn test_e2e_flaky_producer_is_retried() {
        let producer = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .expect(2)
            .mount(&producer)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&producer)
            .await;

        let app = stack(&config_for(&producer));
        let album_id = create_album(&app.router).await;

        assert_eq!(
            post_review(&app.router, "like", &album_id).await,
            StatusCode::CREATED
        );

        let stats = app.client.snapshot();
        assert_eq!((stats.sent, stats.succeeded, stats.failed), (1, 1, 2));
        app.client.close().await;
    }

    /// Producer keeps rejecting: 500 to the caller, no fourth attempt
    #[tokio::test]
    async fn test_e2e_exhausted_retries_return_500() {
        let producer = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&producer)
            .await;

        let app = stack(&config_for(&producer));
        let album_id = create_album(&app.router).await;

        assert_eq!(
            post_review(&app.router, "like", &album_id).await,
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let stats = app.client.snapshot();
        assert_eq!((stats.sent, stats.succeeded, stats.failed), (1, 0, 3));
        app.client.close().await;
    }

    /// 50 concurrent dispatches all resolve and all succeed
    #[tokio::test]
    async fn test_concurrent_dispatches() {
        let producer = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/publish"))
            .respond_with(ResponseTemplate::new(201))
            .expect(50)
            .mount(&producer)
            .await;

        let client = DispatchClient::from_config(&config_for(&producer)).unwrap();
        let handles: Vec<_> = (0..50)
            .map(|i| client.dispatch(ReviewEvent::new(ReviewType::Like, format!("album-{i}"))))
            .collect();

        for handle in handles {
            assert_eq!(handle.await, DispatchOutcome::Success);
        }

        let stats = client.snapshot();
        assert_eq!((stats.sent, stats.succeeded, stats.failed), (50, 50, 0));
        client.close().await;
    }

    /// Close while attempts are in flight: bounded, nothing left running
    #[tokio::test]
    async fn test_close_with_in_flight_dispatches() {
        let producer = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_secs(30)))
            .mount(&producer)
            .await;

        let client = DispatchClient::from_config(&config_for(&producer)).unwrap();
        let handles: Vec<_> = (0..5)
            .map(|i| client.dispatch(ReviewEvent::new(ReviewType::Dislike, format!("a{i}"))))
            .collect();

        // Let the requests reach the producer
        tokio::time::sleep(Duration::from_millis(200)).await;

        let started = Instant::now();
        client.close().await;
        assert!(started.elapsed() < Duration::from_secs(3));
        assert_eq!(client.state(), LifecycleState::Stopped);
        assert_eq!(client.in_flight(), 0);
        assert!(!client.reporter_running());

        for handle in handles {
            assert_eq!(
                handle.await,
                DispatchOutcome::Failure(DispatchError::ShutdownInProgress)
            );
        }

        // Rejected without touching the network
        let late = client.dispatch(ReviewEvent::new(ReviewType::Like, "late")).await;
        assert_eq!(late, DispatchOutcome::Failure(DispatchError::ShutdownInProgress));
    }

    /// Producer unreachable: transport errors are retried, then surface as failure
    #[tokio::test]
    async fn test_unreachable_producer() {
        // Released port: nothing is listening there any more
        let mut config = AppConfig::with_producer_host("127.0.0.1");
        config.producer.port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        config.producer.connect_timeout_ms = 1000;
        config.retry.base_delay_ms = 10;

        let client = DispatchClient::from_config(&config).unwrap();
        let outcome = client
            .send_review("like", "abc")
            .unwrap()
            .await;

        assert!(matches!(
            outcome,
            DispatchOutcome::Failure(DispatchError::Transport { .. })
        ));
        assert_eq!(client.snapshot().failed, 3);
        client.close().await;
    }
}

//! Request accounting: metrics for every request, sampled info logging

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, info};

/// Log every Nth request at info level
const LOG_INTERVAL: u64 = 100;

/// Shared request counter
#[derive(Debug, Default)]
pub struct RequestLog {
    count: AtomicU64,
}

impl RequestLog {
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

/// Middleware: count, time and log each request
pub async fn track_requests(
    State(log): State<Arc<RequestLog>>,
    matched: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let n = log.count.fetch_add(1, Ordering::Relaxed) + 1;
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let route = matched
        .as_ref()
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    let status = response.status().as_u16();

    if n % LOG_INTERVAL == 0 {
        info!(request = n, %method, %path, status, "Request handled");
    } else {
        debug!(request = n, %method, %path, status, "Request handled");
    }
    observability::record_http_request(&route, status);

    response
}

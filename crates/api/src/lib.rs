//! # API
//!
//! Inbound HTTP surface of the album store (axum).
//!
//! Handlers are generic over the storage collaborator (`AlbumStore`) and the
//! review sink (`ReviewPublisher`); production wires in `InMemoryAlbumStore`
//! and the dispatcher's `DispatchClient`.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use contracts::{AlbumStore, ReviewPublisher, ServerConfig};

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod store;

pub use error::ApiError;
pub use middleware::RequestLog;
pub use store::InMemoryAlbumStore;

/// Room for the text parts and multipart framing on top of the image limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state
///
/// Passed to all handlers via axum's `State` extractor.
pub struct AppState<S, P> {
    inner: Arc<AppStateInner<S, P>>,
}

struct AppStateInner<S, P> {
    store: Arc<S>,
    publisher: Arc<P>,
    /// Upper bound on waiting for a review dispatch
    request_timeout: Duration,
    max_image_bytes: usize,
}

impl<S, P> Clone for AppState<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, P> AppState<S, P> {
    pub fn new(store: Arc<S>, publisher: Arc<P>, server: &ServerConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                publisher,
                request_timeout: server.request_timeout(),
                max_image_bytes: server.max_image_bytes,
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn publisher(&self) -> &P {
        &self.inner.publisher
    }

    pub fn request_timeout(&self) -> Duration {
        self.inner.request_timeout
    }

    pub fn max_image_bytes(&self) -> usize {
        self.inner.max_image_bytes
    }
}

/// Builds the axum Router with all endpoints
pub fn build_router<S, P>(state: AppState<S, P>) -> Router
where
    S: AlbumStore + Sync + 'static,
    P: ReviewPublisher,
{
    let body_limit = state.max_image_bytes().saturating_add(MULTIPART_OVERHEAD);
    let requests = Arc::new(RequestLog::default());

    Router::new()
        .route(
            "/albums",
            post(handlers::create_album::<S, P>).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/albums/{album_id}", get(handlers::get_album::<S, P>))
        .route(
            "/review/{likeornot}/{album_id}",
            post(handlers::post_review::<S, P>),
        )
        .route("/review/{album_id}", get(handlers::get_review_stats::<S, P>))
        .route("/admin/reset", post(handlers::admin_reset::<S, P>))
        .route("/health", get(handlers::health))
        .layer(axum::middleware::from_fn_with_state(
            requests,
            middleware::track_requests,
        ))
        .with_state(state)
}

//! Review endpoints
//!
//! `post_review` hands the event to the publisher and waits for its outcome
//! without holding a thread; the wait is bounded by the request timeout.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{debug, error, instrument, warn};

use contracts::{
    AlbumStore, DispatchOutcome, PendingDispatch, ReviewEvent, ReviewPublisher, ReviewStats,
    ReviewType,
};

use crate::error::ApiError;
use crate::AppState;

/// `POST /review/{likeornot}/{album_id}`
///
/// 201 with an empty body once the producer accepted the event,
/// 500 when the dispatch failed or did not finish in time.
#[instrument(name = "post_review", skip_all, fields(likeornot = %likeornot, album_id = %album_id))]
pub async fn post_review<S, P>(
    State(state): State<AppState<S, P>>,
    Path((likeornot, album_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError>
where
    S: AlbumStore + Sync + 'static,
    P: ReviewPublisher,
{
    let review_type: ReviewType = likeornot.parse().map_err(|_| {
        warn!("Invalid review type");
        ApiError::InvalidReviewType
    })?;

    if !state.store().album_exists(&album_id).await? {
        warn!("Album not found for review");
        return Err(ApiError::AlbumNotFound);
    }

    // Dropping `pending` (client went away) cancels the dispatch
    let mut pending = state
        .publisher()
        .publish(ReviewEvent::new(review_type, album_id));

    let outcome = match tokio::time::timeout(state.request_timeout(), &mut pending).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(
                timeout_ms = state.request_timeout().as_millis() as u64,
                "Review dispatch timed out, cancelling"
            );
            pending.cancel();
            pending.await
        }
    };

    match outcome {
        DispatchOutcome::Success => {
            debug!("Review event accepted");
            Ok(StatusCode::CREATED)
        }
        DispatchOutcome::Failure(cause) => {
            error!(error = %cause, "Failed to send review event");
            Err(ApiError::ReviewFailed)
        }
    }
}

/// `GET /review/{album_id}`
pub async fn get_review_stats<S, P>(
    State(state): State<AppState<S, P>>,
    Path(album_id): Path<String>,
) -> Result<Json<ReviewStats>, ApiError>
where
    S: AlbumStore + Sync + 'static,
    P: ReviewPublisher,
{
    if !state.store().album_exists(&album_id).await? {
        return Err(ApiError::AlbumNotFound);
    }
    Ok(Json(state.store().get_review_stats(&album_id).await?))
}

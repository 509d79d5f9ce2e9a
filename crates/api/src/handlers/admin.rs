//! Admin endpoints

use axum::extract::State;
use axum::Json;
use tracing::{error, info};

use contracts::{AlbumStore, ErrorMsg, ReviewPublisher};

use crate::error::ApiError;
use crate::AppState;

/// `POST /admin/reset`: drop every album and review count
pub async fn admin_reset<S, P>(State(state): State<AppState<S, P>>) -> Result<Json<ErrorMsg>, ApiError>
where
    S: AlbumStore + Sync + 'static,
    P: ReviewPublisher,
{
    match state.store().clear_all_data().await {
        Ok(()) => {
            info!("Database reset");
            Ok(Json(ErrorMsg::new("Reset database successful")))
        }
        Err(e) => {
            error!(error = %e, "Database reset failed");
            Err(ApiError::ResetFailed)
        }
    }
}

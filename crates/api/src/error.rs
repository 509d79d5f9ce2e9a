//! API error type
//!
//! Every non-2xx response carries an `ErrorMsg` JSON body.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use contracts::{ContractError, ErrorMsg};

/// Errors surfaced by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Review type must be 'like' or 'dislike'")]
    InvalidReviewType,

    #[error("Album not found")]
    AlbumNotFound,

    #[error("Multipart content expected")]
    MultipartExpected,

    #[error("Invalid multipart body: {0}")]
    InvalidMultipart(String),

    #[error("Missing required fields")]
    MissingFields,

    #[error("Image exceeds the {limit} byte limit")]
    ImageTooLarge { limit: usize },

    /// Dispatch resolved as a failure (or timed out)
    #[error("Failed to process review")]
    ReviewFailed,

    #[error("Failed to save album")]
    SaveFailed,

    #[error("Reset database failed")]
    ResetFailed,

    /// Storage error outside the cases above
    #[error("Internal server error: {0}")]
    Storage(#[from] ContractError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidReviewType
            | Self::MultipartExpected
            | Self::InvalidMultipart(_)
            | Self::MissingFields
            | Self::ImageTooLarge { .. } => StatusCode::BAD_REQUEST,
            Self::AlbumNotFound => StatusCode::NOT_FOUND,
            Self::ReviewFailed | Self::SaveFailed | Self::ResetFailed | Self::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Map a multipart read error, recognising the body limit
    pub(crate) fn from_multipart(err: MultipartError, limit: usize) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::ImageTooLarge { limit }
        } else {
            Self::InvalidMultipart(err.body_text())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorMsg::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::InvalidReviewType.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AlbumNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::ReviewFailed.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Storage(ContractError::storage("get", "boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_match_wire_contract() {
        assert_eq!(
            ApiError::InvalidReviewType.to_string(),
            "Review type must be 'like' or 'dislike'"
        );
        assert_eq!(ApiError::ReviewFailed.to_string(), "Failed to process review");
        assert_eq!(ApiError::AlbumNotFound.to_string(), "Album not found");
    }
}

//! Album upload and lookup

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use bytes::Bytes;
use tracing::{debug, error, instrument, warn};

use contracts::{AlbumInfo, AlbumStore, ImageMetaData, NewAlbum, ReviewPublisher};

use crate::error::ApiError;
use crate::AppState;

/// `POST /albums`: multipart with `image`, `artist`, `title`, `year`
#[instrument(name = "create_album", skip_all)]
pub async fn create_album<S, P>(
    State(state): State<AppState<S, P>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageMetaData>, ApiError>
where
    S: AlbumStore + Sync + 'static,
    P: ReviewPublisher,
{
    let mut multipart = multipart.map_err(|rejection| {
        warn!(reason = %rejection, "Request is not multipart");
        ApiError::MultipartExpected
    })?;
    let limit = state.max_image_bytes();

    let mut image: Option<Bytes> = None;
    let mut artist = None;
    let mut title = None;
    let mut year = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from_multipart(e, limit))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "image" => {
                image = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::from_multipart(e, limit))?,
                )
            }
            "artist" | "title" | "year" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::from_multipart(e, limit))?;
                match name.as_str() {
                    "artist" => artist = Some(value),
                    "title" => title = Some(value),
                    _ => year = Some(value),
                }
            }
            other => debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let (Some(image), Some(artist), Some(title), Some(year)) = (image, artist, title, year) else {
        warn!("Album upload is missing required fields");
        return Err(ApiError::MissingFields);
    };
    if image.len() > limit {
        return Err(ApiError::ImageTooLarge { limit });
    }

    let image_len = image.len();
    let album = NewAlbum {
        info: AlbumInfo {
            artist,
            title,
            year,
        },
        image,
    };

    let album_id = state.store().save_album(album).await.map_err(|e| {
        error!(error = %e, "Failed to save album");
        ApiError::SaveFailed
    })?;

    debug!(album_id = %album_id, image_len, "Album created");
    Ok(Json(ImageMetaData::new(album_id, image_len)))
}

/// `GET /albums/{album_id}`
pub async fn get_album<S, P>(
    State(state): State<AppState<S, P>>,
    Path(album_id): Path<String>,
) -> Result<Json<AlbumInfo>, ApiError>
where
    S: AlbumStore + Sync + 'static,
    P: ReviewPublisher,
{
    match state.store().get_album_by_id(&album_id).await? {
        Some(info) => Ok(Json(info)),
        None => {
            warn!(album_id = %album_id, "Album not found");
            Err(ApiError::AlbumNotFound)
        }
    }
}

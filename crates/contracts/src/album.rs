//! Album models exchanged with HTTP clients and the storage collaborator

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Album metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub artist: String,
    pub title: String,
    pub year: String,
}

/// Album to be stored: metadata plus cover image
#[derive(Debug, Clone)]
pub struct NewAlbum {
    pub info: AlbumInfo,
    pub image: Bytes,
}

/// Response body of a successful album upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetaData {
    #[serde(rename = "albumID")]
    pub album_id: String,
    /// Image length in bytes, as a decimal string
    #[serde(rename = "imageSize")]
    pub image_size: String,
}

impl ImageMetaData {
    pub fn new(album_id: impl Into<String>, image_len: usize) -> Self {
        Self {
            album_id: album_id.into(),
            image_size: image_len.to_string(),
        }
    }
}

/// Like/dislike counts for an album
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub likes: u64,
    pub dislikes: u64,
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMsg {
    pub msg: String,
}

impl ErrorMsg {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

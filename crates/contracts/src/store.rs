//! AlbumStore trait - storage collaborator interface
//!
//! Defines the abstract interface the request layer persists through.

use crate::{AlbumInfo, ContractError, NewAlbum, ReviewStats, ReviewType};

/// Album and review storage
///
/// All storage backends must implement this trait.
#[trait_variant::make(AlbumStore: Send)]
pub trait LocalAlbumStore {
    /// Persist an album and return its generated id
    ///
    /// # Errors
    /// Returns storage error (should include context)
    async fn save_album(&self, album: NewAlbum) -> Result<String, ContractError>;

    /// Look up album metadata
    async fn get_album_by_id(&self, album_id: &str) -> Result<Option<AlbumInfo>, ContractError>;

    /// Check whether an album exists
    async fn album_exists(&self, album_id: &str) -> Result<bool, ContractError>;

    /// Like/dislike counts for an album
    async fn get_review_stats(&self, album_id: &str) -> Result<ReviewStats, ContractError>;

    /// Record one review against an album
    async fn record_review(
        &self,
        album_id: &str,
        review_type: ReviewType,
    ) -> Result<(), ContractError>;

    /// Remove all albums and reviews
    async fn clear_all_data(&self) -> Result<(), ContractError>;
}

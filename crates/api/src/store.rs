//! In-memory AlbumStore

use std::collections::HashMap;

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use contracts::{AlbumInfo, AlbumStore, ContractError, NewAlbum, ReviewStats, ReviewType};

/// Album ids are the first 20 hex chars of a v4 UUID
const ALBUM_ID_LEN: usize = 20;

struct AlbumRecord {
    info: AlbumInfo,
    image: Bytes,
    stats: ReviewStats,
}

/// Process-local store; contents are lost on restart
#[derive(Default)]
pub struct InMemoryAlbumStore {
    albums: RwLock<HashMap<String, AlbumRecord>>,
}

impl InMemoryAlbumStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.albums.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.albums.read().await.is_empty()
    }

    /// Stored image length, if the album exists
    pub async fn image_size(&self, album_id: &str) -> Option<usize> {
        self.albums
            .read()
            .await
            .get(album_id)
            .map(|record| record.image.len())
    }
}

fn new_album_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ALBUM_ID_LEN);
    id
}

impl AlbumStore for InMemoryAlbumStore {
    async fn save_album(&self, album: NewAlbum) -> Result<String, ContractError> {
        let mut albums = self.albums.write().await;

        // One retry on collision, then give up
        let id = [new_album_id(), new_album_id()]
            .into_iter()
            .find(|id| !albums.contains_key(id))
            .ok_or_else(|| ContractError::storage("save_album", "album id collision"))?;

        debug!(album_id = %id, image_bytes = album.image.len(), "Album saved");
        albums.insert(
            id.clone(),
            AlbumRecord {
                info: album.info,
                image: album.image,
                stats: ReviewStats::default(),
            },
        );
        Ok(id)
    }

    async fn get_album_by_id(&self, album_id: &str) -> Result<Option<AlbumInfo>, ContractError> {
        Ok(self
            .albums
            .read()
            .await
            .get(album_id)
            .map(|record| record.info.clone()))
    }

    async fn album_exists(&self, album_id: &str) -> Result<bool, ContractError> {
        Ok(self.albums.read().await.contains_key(album_id))
    }

    async fn get_review_stats(&self, album_id: &str) -> Result<ReviewStats, ContractError> {
        Ok(self
            .albums
            .read()
            .await
            .get(album_id)
            .map(|record| record.stats)
            .unwrap_or_default())
    }

    async fn record_review(
        &self,
        album_id: &str,
        review_type: ReviewType,
    ) -> Result<(), ContractError> {
        let mut albums = self.albums.write().await;
        let record = albums.get_mut(album_id).ok_or_else(|| {
            ContractError::storage("record_review", format!("album {album_id} not found"))
        })?;
        match review_type {
            ReviewType::Like => record.stats.likes += 1,
            ReviewType::Dislike => record.stats.dislikes += 1,
        }
        Ok(())
    }

    async fn clear_all_data(&self) -> Result<(), ContractError> {
        let mut albums = self.albums.write().await;
        let removed = albums.len();
        albums.clear();
        info!(removed, "All album data cleared");
        Ok(())
    }
}

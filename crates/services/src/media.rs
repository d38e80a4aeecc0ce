use async_trait::async_trait;
use dashmap::DashMap;
use liveroom_db::models::Media;

use crate::dao::{DaoResult, media::MediaDao};

/// Resolves media descriptors by ID. Unknown IDs are simply absent from the result.
#[async_trait]
pub trait MediaLookup: Send + Sync {
    async fn retrieve_medias_by_ids(&self, ids: &[String]) -> DaoResult<Vec<Media>>;
}

#[async_trait]
impl MediaLookup for MediaDao {
    async fn retrieve_medias_by_ids(&self, ids: &[String]) -> DaoResult<Vec<Media>> {
        self.find_by_ids(ids).await
    }
}

#[derive(Default)]
pub struct InMemoryMedia {
    media: DashMap<String, Media>,
}

impl InMemoryMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, media: Media) {
        self.media.insert(media.media_id.clone(), media);
    }
}

#[async_trait]
impl MediaLookup for InMemoryMedia {
    async fn retrieve_medias_by_ids(&self, ids: &[String]) -> DaoResult<Vec<Media>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.media.get(id).map(|m| m.clone()))
            .collect())
    }
}

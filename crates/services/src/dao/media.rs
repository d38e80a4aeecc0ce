use bson::doc;
use mongodb::Database;
use liveroom_db::models::Media;

use super::base::{BaseDao, DaoResult};

pub struct MediaDao {
    pub base: BaseDao<Media>,
}

impl MediaDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Media::COLLECTION),
        }
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> DaoResult<Vec<Media>> {
        self.base.find_many(doc! { "_id": { "$in": ids.to_vec() } }, None).await
    }
}

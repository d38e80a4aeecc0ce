use bson::doc;
use mongodb::Database;
use liveroom_db::models::Student;

use super::base::{BaseDao, DaoResult};

pub struct StudentDao {
    pub base: BaseDao<Student>,
}

impl StudentDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Student::COLLECTION),
        }
    }

    pub async fn exists(&self, user_id: &str) -> DaoResult<bool> {
        Ok(self.base.find_one(doc! { "_id": user_id }).await?.is_some())
    }
}

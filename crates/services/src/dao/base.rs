use bson::{Bson, Document, doc};
use mongodb::{ClientSession, Collection, Database, results::UpdateResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("No rows updated")]
    NoRowsUpdated,
}

pub type DaoResult<T> = Result<T, DaoError>;

/// Thin typed wrapper over a collection. The `*_in` variants run inside the
/// caller's session so they take part in its transaction.
pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
        }
    }

    pub async fn find_by_id(&self, id: impl Into<Bson>) -> DaoResult<T> {
        self.collection
            .find_one(doc! { "_id": id.into() })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_one(&self, filter: Document) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_many(&self, filter: Document, sort: Option<Document>) -> DaoResult<Vec<T>> {
        let mut cursor = if let Some(sort) = sort {
            self.collection.find(filter).sort(sort).await?
        } else {
            self.collection.find(filter).await?
        };

        let mut results = Vec::new();
        use futures::TryStreamExt;
        while let Some(doc) = cursor.try_next().await? {
            results.push(doc);
        }
        Ok(results)
    }

    pub async fn insert_one(&self, doc: &T) -> DaoResult<()> {
        let result = self
            .collection
            .insert_one(doc)
            .await
            .map_err(map_write_error)?;
        debug!(id = ?result.inserted_id, "Inserted document");
        Ok(())
    }

    pub async fn update_one(&self, filter: Document, update: Document) -> DaoResult<bool> {
        let result = self
            .collection
            .update_one(filter, with_timestamp(update))
            .await
            .map_err(map_write_error)?;
        Ok(result.matched_count > 0)
    }

    pub async fn upsert_one(&self, filter: Document, update: Document) -> DaoResult<()> {
        self.collection
            .update_one(filter, with_timestamp(update))
            .upsert(true)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    pub async fn find_one_in(
        &self,
        session: &mut ClientSession,
        filter: Document,
    ) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).session(session).await?)
    }

    pub async fn find_many_in(
        &self,
        session: &mut ClientSession,
        filter: Document,
    ) -> DaoResult<Vec<T>> {
        let mut cursor = self.collection.find(filter).session(&mut *session).await?;
        let mut results = Vec::new();
        while let Some(doc) = cursor.next(&mut *session).await {
            results.push(doc?);
        }
        Ok(results)
    }

    pub async fn insert_one_in(&self, session: &mut ClientSession, doc: &T) -> DaoResult<()> {
        self.collection
            .insert_one(doc)
            .session(session)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    pub async fn update_one_in(
        &self,
        session: &mut ClientSession,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> DaoResult<UpdateResult> {
        self.collection
            .update_one(filter, with_timestamp(update))
            .upsert(upsert)
            .session(session)
            .await
            .map_err(map_write_error)
    }

    pub async fn update_many_in(
        &self,
        session: &mut ClientSession,
        filter: Document,
        update: Document,
    ) -> DaoResult<u64> {
        let result = self
            .collection
            .update_many(filter, with_timestamp(update))
            .session(session)
            .await
            .map_err(map_write_error)?;
        Ok(result.modified_count)
    }
}

/// Stamps `updated_at` into the `$set` stage, creating it if missing.
fn with_timestamp(mut update: Document) -> Document {
    let now = bson::DateTime::now();
    match update.get_document_mut("$set") {
        Ok(set_doc) => {
            set_doc.insert("updated_at", now);
        }
        Err(_) => {
            update.insert("$set", doc! { "updated_at": now });
        }
    }
    update
}

pub(crate) fn map_write_error(e: mongodb::error::Error) -> DaoError {
    if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
        ref write_error,
    )) = *e.kind
    {
        if write_error.code == 11000 {
            return DaoError::DuplicateKey(write_error.message.clone());
        }
    }
    DaoError::Mongo(e)
}

use bson::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Media {
    #[serde(rename = "_id")]
    pub media_id: String,
    pub name: String,
    pub resource: String,
    #[serde(default)]
    pub media_type: MediaType,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Video,
    Audio,
    #[default]
    Pdf,
    Image,
}

impl Media {
    pub const COLLECTION: &'static str = "media";

    pub fn new(
        media_id: impl Into<String>,
        name: impl Into<String>,
        resource: impl Into<String>,
        media_type: MediaType,
    ) -> Self {
        Self {
            media_id: media_id.into(),
            name: name.into(),
            resource: resource.into(),
            media_type,
            created_at: DateTime::now(),
        }
    }
}

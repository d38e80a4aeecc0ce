use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Read-only projection of the students directory used for role resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub user_id: String,
    pub created_at: DateTime,
}

impl Student {
    pub const COLLECTION: &'static str = "students";
}

use async_trait::async_trait;
use dashmap::DashSet;
use mongodb::Database;

use crate::dao::{DaoResult, student::StudentDao};

/// Answers whether a user takes part in rooms as a learner.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn is_learner(&self, user_id: &str) -> DaoResult<bool>;
}

/// Learners are the users with a row in the `students` collection.
pub struct StudentRoles {
    students: StudentDao,
}

impl StudentRoles {
    pub fn new(db: &Database) -> Self {
        Self {
            students: StudentDao::new(db),
        }
    }
}

#[async_trait]
impl RoleResolver for StudentRoles {
    async fn is_learner(&self, user_id: &str) -> DaoResult<bool> {
        self.students.exists(user_id).await
    }
}

/// Fixed set of learner IDs, for the memory backend and tests.
#[derive(Default)]
pub struct StaticRoles {
    learners: DashSet<String>,
}

impl StaticRoles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_learner(&self, user_id: impl Into<String>) {
        self.learners.insert(user_id.into());
    }
}

#[async_trait]
impl RoleResolver for StaticRoles {
    async fn is_learner(&self, user_id: &str) -> DaoResult<bool> {
        Ok(self.learners.contains(user_id))
    }
}

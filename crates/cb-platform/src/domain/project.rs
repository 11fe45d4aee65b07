//! Project entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    /// Bumped on every content change; pins publish job identity
    pub revision: i64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        workspace_id: impl Into<String>,
        name: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            workspace_id: workspace_id.into(),
            name: name.into(),
            revision: 1,
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn bump_revision(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }

    /// Deduplication id for publishing this revision: retrying the same
    /// logical publish yields the same id, so the broker enqueues once.
    pub fn publish_job_id(&self) -> String {
        format!("publish:{}:{}", self.id, self.revision)
    }
}

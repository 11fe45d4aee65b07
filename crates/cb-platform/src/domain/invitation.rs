//! Workspace invitation entity.
//!
//! Acceptance and expiry live in the workspace module; the core only
//! guarantees the record is created once per accepted request and the
//! notification is queued, never delivered inline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub workspace_id: String,
    pub invitee_email: String,
    /// Principal id of the inviter
    pub invited_by: String,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn new(
        workspace_id: impl Into<String>,
        invitee_email: impl Into<String>,
        invited_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            workspace_id: workspace_id.into(),
            invitee_email: invitee_email.into(),
            invited_by: invited_by.into(),
            created_at: Utc::now(),
        }
    }
}

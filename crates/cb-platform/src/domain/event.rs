//! Identity-provider lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Event type provisioning a new local account.
pub const USER_CREATED: &str = "user.created";
/// Event type updating an existing local account.
pub const USER_UPDATED: &str = "user.updated";

/// Envelope of a lifecycle event pushed by the identity provider.
///
/// The raw body is signature-verified before this is ever parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityEvent {
    /// Provider-issued event id, when the provider sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub event_type: String,

    /// Provider-side event time. Ordering between events for the same
    /// subject follows this, not arrival order - redelivery can reorder.
    pub timestamp: DateTime<Utc>,

    pub data: serde_json::Value,
}

/// User payload carried by `user.created` / `user.updated` events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    /// Provider subject id
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl IdentityEvent {
    pub fn user_payload(&self) -> Result<UserPayload, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }

    /// Redelivery identity: the provider event id when present, otherwise a
    /// deterministic digest of the event content.
    pub fn dedup_id(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }

        let mut hasher = Sha256::new();
        hasher.update(self.event_type.as_bytes());
        hasher.update(self.timestamp.timestamp_millis().to_be_bytes());
        hasher.update(self.data.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

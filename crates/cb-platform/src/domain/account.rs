//! Local account records provisioned from identity events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserPayload;

/// Account mirroring an identity-provider user.
///
/// `last_event_id` / `last_event_at` carry the idempotence state: a
/// redelivered event is recognized by id, and an event older than
/// `last_event_at` is stale and must not overwrite newer state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    /// Identity-provider subject this account mirrors
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_event_id: Option<String>,
    pub last_event_at: DateTime<Utc>,
}

impl Account {
    /// Materialize an account from a verified identity event.
    pub fn from_event(user: &UserPayload, event_id: &str, event_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            subject: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: now,
            updated_at: now,
            last_event_id: Some(event_id.to_string()),
            last_event_at: event_at,
        }
    }

    /// Overlay the fields carried by an update event.
    pub fn apply_update(&mut self, user: &UserPayload, event_id: &str, event_at: DateTime<Utc>) {
        self.email = user.email.clone();
        self.name = user.name.clone();
        self.updated_at = Utc::now();
        self.last_event_id = Some(event_id.to_string());
        self.last_event_at = event_at;
    }
}

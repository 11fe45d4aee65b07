//! Account provisioning from identity events.
//!
//! Events arrive at-least-once and possibly out of order. Provisioning is
//! idempotent: redeliveries are recognized by event id, stale updates lose
//! to the newest applied event timestamp, and only store failures surface
//! as errors (5xx, so the provider redelivers).

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{Account, IdentityEvent, UserPayload, USER_CREATED, USER_UPDATED};
use crate::error::PlatformError;
use crate::repository::AccountStore;

/// Outcome of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    Updated,
    /// Redelivery of an event already applied
    AlreadyApplied,
    /// Older than state already applied for the subject
    Stale,
    /// Event type the platform does not provision from
    Ignored,
}

impl ProvisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::AlreadyApplied => "ALREADY_APPLIED",
            Self::Stale => "STALE",
            Self::Ignored => "IGNORED",
        }
    }
}

pub struct ProvisioningService {
    accounts: Arc<dyn AccountStore>,
}

impl ProvisioningService {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Apply a signature-verified identity event.
    pub async fn apply(&self, event: &IdentityEvent) -> Result<ProvisionOutcome, PlatformError> {
        match event.event_type.as_str() {
            USER_CREATED => self.apply_created(event).await,
            USER_UPDATED => self.apply_updated(event).await,
            other => {
                // Accepted but not provisioned, so the provider stops
                // retrying harmless unsupported types.
                debug!(event_type = %other, "ignoring unsupported identity event");
                Ok(ProvisionOutcome::Ignored)
            }
        }
    }

    async fn apply_created(&self, event: &IdentityEvent) -> Result<ProvisionOutcome, PlatformError> {
        let user = parse_user(event)?;
        let account = Account::from_event(&user, &event.dedup_id(), event.timestamp);

        let inserted = self
            .accounts
            .insert_if_absent(&account)
            .await
            .map_err(PlatformError::provisioning)?;

        if inserted {
            info!(subject = %user.id, account_id = %account.id, "account provisioned");
            Ok(ProvisionOutcome::Created)
        } else {
            debug!(subject = %user.id, "account already exists, create ignored");
            Ok(ProvisionOutcome::AlreadyApplied)
        }
    }

    async fn apply_updated(&self, event: &IdentityEvent) -> Result<ProvisionOutcome, PlatformError> {
        let user = parse_user(event)?;
        let dedup_id = event.dedup_id();

        let existing = self
            .accounts
            .find_by_subject(&user.id)
            .await
            .map_err(PlatformError::provisioning)?;

        let Some(existing) = existing else {
            // Redelivery reordered the stream and the update arrived before
            // the create: materialize the account from the update.
            let account = Account::from_event(&user, &dedup_id, event.timestamp);
            let inserted = self
                .accounts
                .insert_if_absent(&account)
                .await
                .map_err(PlatformError::provisioning)?;
            return Ok(if inserted {
                info!(subject = %user.id, "account materialized from update event");
                ProvisionOutcome::Created
            } else {
                ProvisionOutcome::AlreadyApplied
            });
        };

        if existing.last_event_id.as_deref() == Some(dedup_id.as_str()) {
            return Ok(ProvisionOutcome::AlreadyApplied);
        }
        if event.timestamp < existing.last_event_at {
            debug!(subject = %user.id, "stale update event skipped");
            return Ok(ProvisionOutcome::Stale);
        }

        let mut updated = existing;
        updated.apply_update(&user, &dedup_id, event.timestamp);

        let applied = self
            .accounts
            .update_if_newer(&updated)
            .await
            .map_err(PlatformError::provisioning)?;

        Ok(if applied {
            info!(subject = %user.id, "account updated");
            ProvisionOutcome::Updated
        } else {
            ProvisionOutcome::Stale
        })
    }
}

fn parse_user(event: &IdentityEvent) -> Result<UserPayload, PlatformError> {
    event
        .user_payload()
        .map_err(|e| PlatformError::validation(format!("malformed user payload: {}", e)))
}

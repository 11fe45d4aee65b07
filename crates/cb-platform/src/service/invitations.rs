//! Workspace invitation flow.
//!
//! Creates the invitation record and queues notification delivery. The
//! request path only pays for the store insert and the enqueue call; the
//! actual delivery happens in a worker consuming the notifications queue.

use std::sync::Arc;

use cb_auth::Principal;
use cb_common::{Job, JobAck};
use cb_queue::JobSink;
use tracing::info;

use crate::domain::{Invitation, Workspace};
use crate::error::PlatformError;
use crate::repository::InvitationStore;

pub struct InvitationService {
    invitations: Arc<dyn InvitationStore>,
    sink: Arc<dyn JobSink>,
    queue: String,
}

impl InvitationService {
    pub fn new(
        invitations: Arc<dyn InvitationStore>,
        sink: Arc<dyn JobSink>,
        queue: impl Into<String>,
    ) -> Self {
        Self {
            invitations,
            sink,
            queue: queue.into(),
        }
    }

    /// Create an invitation and queue its notification.
    ///
    /// The notification job id is the invitation id, so a broker-side retry
    /// of the same invitation deduplicates. An enqueue failure surfaces as
    /// an error - the caller must not be told the notification is on its
    /// way when nothing was queued.
    pub async fn invite(
        &self,
        workspace: &Workspace,
        invitee_email: &str,
        invited_by: &Principal,
    ) -> Result<(Invitation, JobAck), PlatformError> {
        let invitation = Invitation::new(&workspace.id, invitee_email, &invited_by.id);

        self.invitations
            .insert(&invitation)
            .await
            .map_err(PlatformError::database)?;

        let payload = serde_json::json!({
            "invitationId": invitation.id,
            "workspaceId": workspace.id,
            "workspaceName": workspace.name,
            "inviteeEmail": invitee_email,
            "invitedBy": invited_by.id,
        });
        let job = Job::new(self.queue.clone(), invitation.id.clone(), payload);
        let ack = self.sink.enqueue(job).await?;

        info!(
            invitation_id = %invitation.id,
            workspace_id = %workspace.id,
            "invitation created, notification queued"
        );
        Ok((invitation, ack))
    }
}

//! Workspaces API
//!
//! Workspace creation and the invitation flow. Every route runs behind the
//! auth gate; invitation notifications are queued, never delivered inline.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::Envelope;
use crate::api::middleware::Authenticated;
use crate::domain::Workspace;
use crate::error::PlatformError;
use crate::repository::WorkspaceStore;
use crate::service::InvitationService;

/// Create workspace request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspaceRequest {
    pub name: String,
}

/// Workspace response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResponse {
    pub id: String,
    pub name: String,
    pub created_by: String,
    pub created_at: String,
}

impl From<Workspace> for WorkspaceResponse {
    fn from(w: Workspace) -> Self {
        Self {
            id: w.id,
            name: w.name,
            created_by: w.created_by,
            created_at: w.created_at.to_rfc3339(),
        }
    }
}

/// Create invitation request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationRequest {
    pub invitee_email: String,
}

/// Invitation response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvitationResponse {
    pub id: String,
    pub workspace_id: String,
    pub invitee_email: String,
    pub invited_by: String,
    /// Id of the queued notification job
    pub notification_job_id: String,
    pub created_at: String,
}

/// Workspaces service state
#[derive(Clone)]
pub struct WorkspacesState {
    pub workspaces: Arc<dyn WorkspaceStore>,
    pub invitations: Arc<InvitationService>,
}

/// Create a new workspace
#[utoipa::path(
    post,
    path = "/",
    tag = "workspaces",
    request_body = CreateWorkspaceRequest,
    responses(
        (status = 201, description = "Workspace created", body = WorkspaceResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_workspace(
    State(state): State<WorkspacesState>,
    Authenticated(principal): Authenticated,
    Json(req): Json<CreateWorkspaceRequest>,
) -> Result<(StatusCode, Json<Envelope<WorkspaceResponse>>), PlatformError> {
    if req.name.trim().is_empty() {
        return Err(PlatformError::validation("workspace name must not be empty"));
    }

    let workspace = Workspace::new(req.name.trim(), &principal.id);
    state
        .workspaces
        .insert(&workspace)
        .await
        .map_err(PlatformError::database)?;

    Ok(Envelope::created(workspace.into()))
}

/// Get workspace by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "workspaces",
    responses(
        (status = 200, description = "Workspace", body = WorkspaceResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown workspace")
    )
)]
pub async fn get_workspace(
    State(state): State<WorkspacesState>,
    Authenticated(_principal): Authenticated,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Envelope<WorkspaceResponse>>), PlatformError> {
    let workspace = state
        .workspaces
        .find_by_id(&id)
        .await
        .map_err(PlatformError::database)?
        .ok_or_else(|| PlatformError::not_found("Workspace", &id))?;

    Ok(Envelope::ok(workspace.into()))
}

/// Invite someone to a workspace
///
/// Creates the invitation record and queues the notification. Responds once
/// the job is accepted by the broker; a broker failure surfaces as 502 and
/// the caller should retry the invite.
#[utoipa::path(
    post,
    path = "/{id}/invitations",
    tag = "workspaces",
    request_body = CreateInvitationRequest,
    responses(
        (status = 201, description = "Invitation created, notification queued", body = InvitationResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown workspace"),
        (status = 502, description = "Notification could not be queued")
    )
)]
pub async fn create_invitation(
    State(state): State<WorkspacesState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    Json(req): Json<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<Envelope<InvitationResponse>>), PlatformError> {
    if !req.invitee_email.contains('@') {
        return Err(PlatformError::validation("inviteeEmail must be an email address"));
    }

    let workspace = state
        .workspaces
        .find_by_id(&id)
        .await
        .map_err(PlatformError::database)?
        .ok_or_else(|| PlatformError::not_found("Workspace", &id))?;

    let (invitation, ack) = state
        .invitations
        .invite(&workspace, &req.invitee_email, &principal)
        .await?;

    Ok(Envelope::created(InvitationResponse {
        id: invitation.id,
        workspace_id: invitation.workspace_id,
        invitee_email: invitation.invitee_email,
        invited_by: invitation.invited_by,
        notification_job_id: ack.job_id,
        created_at: invitation.created_at.to_rfc3339(),
    }))
}

/// Create the workspaces router
pub fn workspaces_router(state: WorkspacesState) -> Router {
    Router::new()
        .route("/", post(create_workspace))
        .route("/:id", get(get_workspace))
        .route("/:id/invitations", post(create_invitation))
        .with_state(state)
}

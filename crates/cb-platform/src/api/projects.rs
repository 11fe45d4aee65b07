//! Projects API
//!
//! Project CRUD plus the publish endpoint that hands rendering/upload work
//! to the job queue. All routes run behind the auth gate.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::Envelope;
use crate::api::middleware::Authenticated;
use crate::domain::Project;
use crate::error::PlatformError;
use crate::repository::{ProjectStore, WorkspaceStore};
use crate::service::PublishingService;

/// Create project request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub workspace_id: String,
    pub name: String,
}

/// Update project request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: String,
}

/// Project response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub revision: i64,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            workspace_id: p.workspace_id,
            name: p.name,
            revision: p.revision,
            created_by: p.created_by,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// Publish response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub project_id: String,
    pub revision: i64,
    /// Id of the queued publish job
    pub job_id: String,
}

/// Projects service state
#[derive(Clone)]
pub struct ProjectsState {
    pub projects: Arc<dyn ProjectStore>,
    pub workspaces: Arc<dyn WorkspaceStore>,
    pub publishing: Arc<PublishingService>,
}

/// Create a new project
#[utoipa::path(
    post,
    path = "/",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown workspace")
    )
)]
pub async fn create_project(
    State(state): State<ProjectsState>,
    Authenticated(principal): Authenticated,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Envelope<ProjectResponse>>), PlatformError> {
    if req.name.trim().is_empty() {
        return Err(PlatformError::validation("project name must not be empty"));
    }

    state
        .workspaces
        .find_by_id(&req.workspace_id)
        .await
        .map_err(PlatformError::database)?
        .ok_or_else(|| PlatformError::not_found("Workspace", &req.workspace_id))?;

    let project = Project::new(&req.workspace_id, req.name.trim(), &principal.id);
    state
        .projects
        .insert(&project)
        .await
        .map_err(PlatformError::database)?;

    Ok(Envelope::created(project.into()))
}

/// Get project by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "projects",
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown project")
    )
)]
pub async fn get_project(
    State(state): State<ProjectsState>,
    Authenticated(_principal): Authenticated,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Envelope<ProjectResponse>>), PlatformError> {
    let project = load_project(&state, &id).await?;
    Ok(Envelope::ok(project.into()))
}

/// Update a project
///
/// Bumps the revision, which pins a fresh publish job id for the next
/// publish.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "projects",
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown project")
    )
)]
pub async fn update_project(
    State(state): State<ProjectsState>,
    Authenticated(_principal): Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<(StatusCode, Json<Envelope<ProjectResponse>>), PlatformError> {
    if req.name.trim().is_empty() {
        return Err(PlatformError::validation("project name must not be empty"));
    }

    let mut project = load_project(&state, &id).await?;
    project.name = req.name.trim().to_string();
    project.bump_revision();

    state
        .projects
        .update(&project)
        .await
        .map_err(PlatformError::database)?;

    Ok(Envelope::ok(project.into()))
}

/// Publish the project's current revision
///
/// Returns 202 once the broker accepted the job - the actual rendering and
/// upload happen in a worker. Retrying the same revision reuses the same
/// job id, so the broker deduplicates.
#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = "projects",
    responses(
        (status = 202, description = "Publish job accepted", body = PublishResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown project"),
        (status = 502, description = "Broker unavailable, job not queued")
    )
)]
pub async fn publish_project(
    State(state): State<ProjectsState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Envelope<PublishResponse>>), PlatformError> {
    let project = load_project(&state, &id).await?;

    let ack = state.publishing.publish(&project, &principal).await?;

    Ok(Envelope::accepted(
        "Publish accepted",
        PublishResponse {
            project_id: project.id,
            revision: project.revision,
            job_id: ack.job_id,
        },
    ))
}

async fn load_project(state: &ProjectsState, id: &str) -> Result<Project, PlatformError> {
    state
        .projects
        .find_by_id(id)
        .await
        .map_err(PlatformError::database)?
        .ok_or_else(|| PlatformError::not_found("Project", id))
}

/// Create the projects router
pub fn projects_router(state: ProjectsState) -> Router {
    Router::new()
        .route("/", post(create_project))
        .route("/:id", get(get_project).put(update_project))
        .route("/:id/publish", post(publish_project))
        .with_state(state)
}

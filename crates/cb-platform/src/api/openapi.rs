//! OpenAPI documentation

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Castbridge Platform API",
        description = "Workspace/project platform core: auth-gated business routes, \
                       signed identity webhooks, and queued publishing work.",
        version = "0.1.0"
    ),
    paths(
        crate::api::auth::get_current_user,
        crate::api::webhooks::receive_event,
        crate::api::workspaces::create_workspace,
        crate::api::workspaces::get_workspace,
        crate::api::workspaces::create_invitation,
        crate::api::projects::create_project,
        crate::api::projects::get_project,
        crate::api::projects::update_project,
        crate::api::projects::publish_project,
    ),
    components(schemas(
        crate::api::common::ErrorBody,
        crate::api::auth::CurrentUserResponse,
        crate::api::webhooks::ReceiveEventResponse,
        crate::api::workspaces::CreateWorkspaceRequest,
        crate::api::workspaces::WorkspaceResponse,
        crate::api::workspaces::CreateInvitationRequest,
        crate::api::workspaces::InvitationResponse,
        crate::api::projects::CreateProjectRequest,
        crate::api::projects::UpdateProjectRequest,
        crate::api::projects::ProjectResponse,
        crate::api::projects::PublishResponse,
    )),
    tags(
        (name = "auth", description = "Caller identity"),
        (name = "webhooks", description = "Identity-provider event ingestion"),
        (name = "workspaces", description = "Workspaces and invitations"),
        (name = "projects", description = "Projects and publishing")
    )
)]
pub struct PlatformApiDoc;

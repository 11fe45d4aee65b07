//! API Layer
//!
//! REST endpoints for the platform core.

pub mod auth;
pub mod common;
pub mod middleware;
pub mod openapi;
pub mod projects;
pub mod webhooks;
pub mod workspaces;

pub use common::{Envelope, ErrorBody};
pub use middleware::{AppState, Authenticated};

pub use auth::auth_router;
pub use openapi::PlatformApiDoc;
pub use projects::{projects_router, ProjectsState};
pub use webhooks::{webhooks_router, WebhooksState, SIGNATURE_HEADER};
pub use workspaces::{workspaces_router, WorkspacesState};

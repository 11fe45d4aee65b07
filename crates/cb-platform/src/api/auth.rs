//! Auth API Endpoints
//!
//! - GET /auth/me - resolved identity of the caller
//!
//! Tokens are issued by the external identity provider; there is no login
//! endpoint here, only the verified view of who is calling.

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::common::Envelope;
use crate::api::middleware::Authenticated;
use crate::error::PlatformError;

/// Current user info response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    /// Principal id (identity-provider subject)
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Get current user info
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user info", body = CurrentUserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    Authenticated(principal): Authenticated,
) -> Result<(StatusCode, Json<Envelope<CurrentUserResponse>>), PlatformError> {
    Ok(Envelope::ok(CurrentUserResponse {
        id: principal.id,
        email: principal.email,
        name: principal.name,
    }))
}

/// Create the auth router
pub fn auth_router() -> Router {
    Router::new().route("/me", get(get_current_user))
}

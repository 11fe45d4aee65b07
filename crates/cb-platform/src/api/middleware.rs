//! API Middleware
//!
//! The auth gate for Axum: a request-scoped extractor that resolves a
//! verified [`Principal`] before a protected handler runs, or rejects with
//! a structured 401 so the handler never executes.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use cb_auth::{extract_bearer_token, AuthError, CredentialVerifier, Principal};

use crate::error::PlatformError;

/// Application state containing shared verification services.
///
/// Built once at startup and injected as an `Extension`; handlers only ever
/// read from it. The verifier is held as a capability, so the identity
/// provider is swappable without touching the gate.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<dyn CredentialVerifier>,
}

/// Extractor for authenticated requests.
///
/// Verification happens per request with no shared mutable state, so the
/// gate is safe to apply to any number of routes.
pub struct Authenticated(pub Principal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let app_state = parts
            .extensions
            .get::<AppState>()
            .ok_or_else(|| PlatformError::internal("AppState not found").into_response())?;

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                PlatformError::from(AuthError::MissingCredential).into_response()
            })?;

        let token = extract_bearer_token(auth_header).ok_or_else(|| {
            PlatformError::from(AuthError::MissingCredential).into_response()
        })?;

        let principal = app_state
            .verifier
            .verify(token)
            .map_err(|e| PlatformError::from(e).into_response())?;

        Ok(Authenticated(principal))
    }
}

//! Webhook Ingestion
//!
//! Endpoint receiving signed account-lifecycle events from the identity
//! provider. Callers are machines: trust comes from the payload signature
//! alone, so these routes do not sit behind the bearer-token gate.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use cb_auth::signature;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::api::common::Envelope;
use crate::domain::IdentityEvent;
use crate::error::PlatformError;
use crate::service::ProvisioningService;

/// Header carrying the HMAC-SHA256 signature of the raw body.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Webhook service state
#[derive(Clone)]
pub struct WebhooksState {
    pub webhook_secret: Arc<String>,
    pub provisioning: Arc<ProvisioningService>,
}

/// Ingestion result DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveEventResponse {
    pub event_type: String,
    pub outcome: String,
}

/// Receive a signed identity-provider event
///
/// The body must be the exact bytes the provider signed; verification runs
/// before anything is parsed. Signature failures are 401 and provisioning
/// failures are 503 so the provider's retry policy redelivers; unknown
/// event types are accepted and ignored.
#[utoipa::path(
    post,
    path = "/register",
    tag = "webhooks",
    responses(
        (status = 200, description = "Event processed (or ignored)", body = ReceiveEventResponse),
        (status = 400, description = "Signed but malformed payload"),
        (status = 401, description = "Missing or invalid signature"),
        (status = 503, description = "Provisioning store unavailable, redeliver later")
    )
)]
pub async fn receive_event(
    State(state): State<WebhooksState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Envelope<ReceiveEventResponse>>), PlatformError> {
    let signature_header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(PlatformError::SignatureRejected)?;

    // Verify over the exact received bytes; the payload stays untrusted
    // until this passes.
    if !signature::verify(state.webhook_secret.as_bytes(), signature_header, &body) {
        warn!("webhook signature verification failed");
        return Err(PlatformError::SignatureRejected);
    }

    let event: IdentityEvent = serde_json::from_slice(&body)
        .map_err(|e| PlatformError::validation(format!("malformed event payload: {}", e)))?;

    let outcome = state.provisioning.apply(&event).await?;

    Ok(Envelope::ok(ReceiveEventResponse {
        event_type: event.event_type,
        outcome: outcome.as_str().to_string(),
    }))
}

/// Create the webhooks router
pub fn webhooks_router(state: WebhooksState) -> Router {
    Router::new()
        .route("/register", post(receive_event))
        .with_state(state)
}

//! Platform API Integration Tests
//!
//! Drives the composed router end to end - auth gate, webhook ingestion,
//! invitation flow, publish dispatch - with in-memory backends and real
//! RSA-signed bearer tokens.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::{Extension, Router};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tower::ServiceExt;

use cb_auth::keys::generate_rsa_keypair;
use cb_auth::{signature, AccessTokenClaims, BearerVerifier};
use cb_platform::api::{
    auth_router, projects_router, webhooks_router, workspaces_router, AppState, ProjectsState,
    WebhooksState, WorkspacesState, SIGNATURE_HEADER,
};
use cb_platform::repository::{
    AccountStore, MemoryAccountStore, MemoryInvitationStore, MemoryProjectStore,
    MemoryWorkspaceStore,
};
use cb_platform::service::{InvitationService, ProvisioningService, PublishingService};
use cb_queue::InMemoryJobSink;

const ISSUER: &str = "https://idp.example.com";
const WEBHOOK_SECRET: &str = "whsec_test_secret";

struct TestApp {
    router: Router,
    private_pem: String,
    sink: Arc<InMemoryJobSink>,
    accounts: Arc<MemoryAccountStore>,
    projects: Arc<MemoryProjectStore>,
    invitations: Arc<MemoryInvitationStore>,
}

fn create_test_app() -> TestApp {
    let (private_pem, public_pem) = generate_rsa_keypair().unwrap();
    let verifier = Arc::new(BearerVerifier::new(&public_pem, ISSUER).unwrap());

    let accounts = Arc::new(MemoryAccountStore::new());
    let workspaces = Arc::new(MemoryWorkspaceStore::new());
    let projects = Arc::new(MemoryProjectStore::new());
    let invitations = Arc::new(MemoryInvitationStore::new());
    let sink = Arc::new(InMemoryJobSink::new());

    let provisioning = Arc::new(ProvisioningService::new(accounts.clone()));
    let invitation_service = Arc::new(InvitationService::new(
        invitations.clone(),
        sink.clone(),
        "notification-jobs",
    ));
    let publishing = Arc::new(PublishingService::new(sink.clone(), "publish-jobs"));

    let router = Router::new()
        .nest("/auth", auth_router())
        .nest(
            "/webhooks",
            webhooks_router(WebhooksState {
                webhook_secret: Arc::new(WEBHOOK_SECRET.to_string()),
                provisioning,
            }),
        )
        .nest(
            "/workspaces",
            workspaces_router(WorkspacesState {
                workspaces: workspaces.clone(),
                invitations: invitation_service,
            }),
        )
        .nest(
            "/projects",
            projects_router(ProjectsState {
                projects: projects.clone(),
                workspaces: workspaces.clone(),
                publishing,
            }),
        )
        .layer(Extension(AppState { verifier }));

    TestApp {
        router,
        private_pem,
        sink,
        accounts,
        projects,
        invitations,
    }
}

fn mint_token(app: &TestApp, sub: &str) -> String {
    mint_token_with(app, sub, ISSUER, 3600)
}

fn mint_token_with(app: &TestApp, sub: &str, iss: &str, exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = AccessTokenClaims {
        sub: sub.to_string(),
        iss: iss.to_string(),
        exp: now + exp_offset_secs,
        iat: Some(now),
        email: Some(format!("{}@example.com", sub)),
        name: None,
    };
    let key = EncodingKey::from_rsa_pem(app.private_pem.as_bytes()).unwrap();
    encode(&Header::new(Algorithm::RS256), &claims, &key).unwrap()
}

async fn send_json(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn send_webhook(
    app: &TestApp,
    raw_body: &[u8],
    signature_header: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/webhooks/register")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(sig) = signature_header {
        builder = builder.header(SIGNATURE_HEADER, sig);
    }
    let request = builder.body(Body::from(raw_body.to_vec())).unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn identity_event(
    event_type: &str,
    event_id: &str,
    ts: &str,
    data: serde_json::Value,
) -> Vec<u8> {
    serde_json::json!({
        "id": event_id,
        "type": event_type,
        "timestamp": ts,
        "data": data,
    })
    .to_string()
    .into_bytes()
}

fn signed(body: &[u8]) -> String {
    signature::sign(WEBHOOK_SECRET.as_bytes(), body)
}

async fn create_workspace(app: &TestApp, token: &str, name: &str) -> String {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/workspaces",
        Some(token),
        Some(serde_json::json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_project(app: &TestApp, token: &str, workspace_id: &str, name: &str) -> String {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/projects",
        Some(token),
        Some(serde_json::json!({"workspaceId": workspace_id, "name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Auth Gate
// ============================================================================

#[tokio::test]
async fn test_me_returns_principal_for_valid_token() {
    let app = create_test_app();
    let token = mint_token(&app, "user_1");

    let (status, body) = send_json(&app, Method::GET, "/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["data"]["id"], "user_1");
    assert_eq!(body["data"]["email"], "user_1@example.com");
}

#[tokio::test]
async fn test_missing_token_is_structured_401() {
    let app = create_test_app();

    let (status, body) = send_json(&app, Method::GET, "/auth/me", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["statusCode"], 401);
    assert_eq!(body["errorCode"], "MISSING_CREDENTIAL");
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = create_test_app();
    let token = mint_token_with(&app, "user_1", ISSUER, -3600);

    let (status, body) = send_json(&app, Method::GET, "/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorCode"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_wrong_issuer_is_rejected() {
    let app = create_test_app();
    let token = mint_token_with(&app, "user_1", "https://rogue.example.com", 3600);

    let (status, body) = send_json(&app, Method::GET, "/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorCode"], "UNVERIFIED_ISSUER");
}

#[tokio::test]
async fn test_unauthenticated_create_project_writes_nothing() {
    let app = create_test_app();

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/projects",
        None,
        Some(serde_json::json!({"workspaceId": "ws_x", "name": "Video"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorCode"], "MISSING_CREDENTIAL");
    assert_eq!(app.projects.len(), 0);
}

// ============================================================================
// Projects
// ============================================================================

#[tokio::test]
async fn test_create_project_returns_envelope_with_id() {
    let app = create_test_app();
    let token = mint_token(&app, "user_1");
    let workspace_id = create_workspace(&app, &token, "Marketing").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/projects",
        Some(&token),
        Some(serde_json::json!({"workspaceId": workspace_id, "name": "Launch video"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["statusCode"], 201);
    assert!(body["data"]["id"].as_str().is_some());
    assert_eq!(body["data"]["revision"], 1);
    assert_eq!(app.projects.len(), 1);
}

#[tokio::test]
async fn test_create_project_unknown_workspace_is_404() {
    let app = create_test_app();
    let token = mint_token(&app, "user_1");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/projects",
        Some(&token),
        Some(serde_json::json!({"workspaceId": "ws_missing", "name": "Video"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errorCode"], "NOT_FOUND");
    assert_eq!(app.projects.len(), 0);
}

#[tokio::test]
async fn test_publish_is_accepted_and_deduplicates_per_revision() {
    let app = create_test_app();
    let token = mint_token(&app, "user_1");
    let workspace_id = create_workspace(&app, &token, "Marketing").await;
    let project_id = create_project(&app, &token, &workspace_id, "Launch video").await;

    let uri = format!("/projects/{}/publish", project_id);
    let (status, body) = send_json(&app, Method::POST, &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["statusCode"], 202);
    let job_id = body["data"]["jobId"].as_str().unwrap().to_string();
    assert_eq!(job_id, format!("publish:{}:1", project_id));

    // Retrying the same revision reuses the job id; the broker keeps one job
    let (status, body) = send_json(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["data"]["jobId"], job_id);
    assert_eq!(app.sink.job_count(), 1);
}

#[tokio::test]
async fn test_update_bumps_revision_and_next_publish_is_new_job() {
    let app = create_test_app();
    let token = mint_token(&app, "user_1");
    let workspace_id = create_workspace(&app, &token, "Marketing").await;
    let project_id = create_project(&app, &token, &workspace_id, "Launch video").await;

    let (status, body) = send_json(
        &app,
        Method::PUT,
        &format!("/projects/{}", project_id),
        Some(&token),
        Some(serde_json::json!({"name": "Launch video, cut 2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["revision"], 2);

    let uri = format!("/projects/{}/publish", project_id);
    let (_, body) = send_json(&app, Method::POST, &uri, Some(&token), None).await;
    assert_eq!(
        body["data"]["jobId"],
        format!("publish:{}:2", project_id)
    );
}

#[tokio::test]
async fn test_publish_with_broker_offline_is_502_and_no_job() {
    let app = create_test_app();
    let token = mint_token(&app, "user_1");
    let workspace_id = create_workspace(&app, &token, "Marketing").await;
    let project_id = create_project(&app, &token, &workspace_id, "Launch video").await;

    app.sink.set_unavailable(true);
    let uri = format!("/projects/{}/publish", project_id);
    let (status, body) = send_json(&app, Method::POST, &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["errorCode"], "ENQUEUE_FAILED");
    assert_eq!(app.sink.job_count(), 0);
}

// ============================================================================
// Invitations
// ============================================================================

#[tokio::test]
async fn test_invitation_creates_record_and_queues_notification() {
    let app = create_test_app();
    let token = mint_token(&app, "owner_1");
    let workspace_id = create_workspace(&app, &token, "Design").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/workspaces/{}/invitations", workspace_id),
        Some(&token),
        Some(serde_json::json!({"inviteeEmail": "guest@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let invitation_id = body["data"]["id"].as_str().unwrap();
    assert_eq!(body["data"]["notificationJobId"], invitation_id);
    assert_eq!(app.invitations.len(), 1);

    let jobs = app.sink.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].queue, "notification-jobs");
    assert_eq!(jobs[0].job_id, invitation_id);
}

#[tokio::test]
async fn test_invitation_enqueue_failure_surfaces_502() {
    let app = create_test_app();
    let token = mint_token(&app, "owner_1");
    let workspace_id = create_workspace(&app, &token, "Design").await;

    app.sink.set_unavailable(true);
    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/workspaces/{}/invitations", workspace_id),
        Some(&token),
        Some(serde_json::json!({"inviteeEmail": "guest@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["errorCode"], "ENQUEUE_FAILED");
    assert_eq!(app.sink.job_count(), 0);
}

#[tokio::test]
async fn test_invitation_requires_email_shape() {
    let app = create_test_app();
    let token = mint_token(&app, "owner_1");
    let workspace_id = create_workspace(&app, &token, "Design").await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/workspaces/{}/invitations", workspace_id),
        Some(&token),
        Some(serde_json::json!({"inviteeEmail": "not-an-email"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], "VALIDATION_FAILED");
    assert_eq!(app.invitations.len(), 0);
}

#[tokio::test]
async fn test_get_workspace_not_found() {
    let app = create_test_app();
    let token = mint_token(&app, "user_1");

    let (status, body) =
        send_json(&app, Method::GET, "/workspaces/ws_missing", Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errorCode"], "NOT_FOUND");
}

// ============================================================================
// Webhook Ingestion
// ============================================================================

#[tokio::test]
async fn test_webhook_user_created_provisions_exactly_once() {
    let app = create_test_app();
    let body = identity_event(
        "user.created",
        "evt_1",
        "2026-03-01T10:00:00Z",
        serde_json::json!({"id": "user_1", "email": "ada@example.com"}),
    );
    let sig = signed(&body);

    let (status, response) = send_webhook(&app, &body, Some(&sig)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["outcome"], "CREATED");

    // Redelivery of the same event id must not create a second account
    let (status, response) = send_webhook(&app, &body, Some(&sig)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["outcome"], "ALREADY_APPLIED");
    assert_eq!(app.accounts.len(), 1);
}

#[tokio::test]
async fn test_webhook_missing_signature_is_rejected() {
    let app = create_test_app();
    let body = identity_event(
        "user.created",
        "evt_1",
        "2026-03-01T10:00:00Z",
        serde_json::json!({"id": "user_1"}),
    );

    let (status, response) = send_webhook(&app, &body, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["errorCode"], "SIGNATURE_REJECTED");
    assert!(app.accounts.is_empty());
}

#[tokio::test]
async fn test_webhook_tampered_body_is_rejected() {
    let app = create_test_app();
    let original = identity_event(
        "user.created",
        "evt_1",
        "2026-03-01T10:00:00Z",
        serde_json::json!({"id": "user_1", "email": "ada@example.com"}),
    );
    let sig = signed(&original);

    let tampered = identity_event(
        "user.created",
        "evt_1",
        "2026-03-01T10:00:00Z",
        serde_json::json!({"id": "attacker_1", "email": "eve@example.com"}),
    );

    let (status, response) = send_webhook(&app, &tampered, Some(&sig)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["errorCode"], "SIGNATURE_REJECTED");
    assert!(app.accounts.is_empty());
}

#[tokio::test]
async fn test_webhook_unknown_event_type_is_accepted_noop() {
    let app = create_test_app();
    let body = identity_event(
        "organization.created",
        "evt_1",
        "2026-03-01T10:00:00Z",
        serde_json::json!({"id": "org_1"}),
    );
    let sig = signed(&body);

    let (status, response) = send_webhook(&app, &body, Some(&sig)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["data"]["outcome"], "IGNORED");
    assert!(app.accounts.is_empty());
}

#[tokio::test]
async fn test_webhook_malformed_payload_after_valid_signature_is_400() {
    let app = create_test_app();
    let body = b"{\"not\": \"an event\"}".to_vec();
    let sig = signed(&body);

    let (status, response) = send_webhook(&app, &body, Some(&sig)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["errorCode"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_webhook_out_of_order_updates_converge_on_newest() {
    let app = create_test_app();

    let created = identity_event(
        "user.created",
        "evt_1",
        "2026-03-01T09:00:00Z",
        serde_json::json!({"id": "user_1", "email": "ada@example.com"}),
    );
    let newer = identity_event(
        "user.updated",
        "evt_3",
        "2026-03-01T11:00:00Z",
        serde_json::json!({"id": "user_1", "email": "newest@example.com"}),
    );
    let older = identity_event(
        "user.updated",
        "evt_2",
        "2026-03-01T10:00:00Z",
        serde_json::json!({"id": "user_1", "email": "older@example.com"}),
    );

    let (status, _) = send_webhook(&app, &created, Some(&signed(&created))).await;
    assert_eq!(status, StatusCode::OK);

    // T2 redelivered ahead of T1
    let (_, response) = send_webhook(&app, &newer, Some(&signed(&newer))).await;
    assert_eq!(response["data"]["outcome"], "UPDATED");
    let (_, response) = send_webhook(&app, &older, Some(&signed(&older))).await;
    assert_eq!(response["data"]["outcome"], "STALE");

    let account = app
        .accounts
        .find_by_subject("user_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.email.as_deref(), Some("newest@example.com"));
}

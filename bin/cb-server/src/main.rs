//! Castbridge Platform Server
//!
//! Production server for the platform core:
//! - Auth-gated workspace/project APIs
//! - Signed identity-provider webhook ingestion
//! - Publishing pipeline dispatch onto SQS
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CB_API_PORT` | `8080` | HTTP API port |
//! | `CB_DEV_MODE` | `false` | In-memory backends + ephemeral secrets |
//! | `CB_DATABASE_URL` | - | Postgres connection URL (required unless dev mode) |
//! | `CB_IDP_ISSUER` | `https://idp.example.com` | Expected token issuer |
//! | `CB_IDP_PUBLIC_KEY` | - | IdP public key PEM content (required unless dev mode) |
//! | `CB_IDP_PUBLIC_KEY_PATH` | - | Path to IdP public key PEM |
//! | `CB_WEBHOOK_SECRET` | - | Webhook signing secret (required unless dev mode) |
//! | `CB_PUBLISH_QUEUE` | `publish-jobs` | Queue name for publish jobs |
//! | `CB_NOTIFICATION_QUEUE` | `notification-jobs` | Queue name for notification jobs |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::Result;
use axum::response::Json;
use axum::routing::get;
use axum::{Extension, Router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use cb_auth::{keys, BearerVerifier};
use cb_platform::api::{
    auth_router, projects_router, webhooks_router, workspaces_router, AppState, PlatformApiDoc,
    ProjectsState, WebhooksState, WorkspacesState,
};
use cb_platform::repository::{
    init_schema, AccountStore, InvitationStore, MemoryAccountStore, MemoryInvitationStore,
    MemoryProjectStore, MemoryWorkspaceStore, PostgresAccountStore, PostgresInvitationStore,
    PostgresProjectStore, PostgresWorkspaceStore, ProjectStore, WorkspaceStore,
};
use cb_platform::service::{InvitationService, ProvisioningService, PublishingService};
use cb_queue::{InMemoryJobSink, JobSink, SqsJobSink};

mod config;
use config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Starting Castbridge Platform Server");

    // Fail-fast configuration
    let config = ServerConfig::from_env()?;

    // Identity-provider verification key: configured material, or an
    // ephemeral pair in dev mode
    let public_key_pem = match config.idp_public_key_pem.clone() {
        Some(pem) => pem,
        None => {
            let (_, public_pem) = keys::generate_rsa_keypair()?;
            info!(
                fingerprint = %keys::fingerprint(&public_pem),
                "dev mode: generated ephemeral verification key"
            );
            public_pem
        }
    };
    let verifier = Arc::new(BearerVerifier::new(&public_key_pem, &config.idp_issuer)?);

    let webhook_secret = match config.webhook_secret.clone() {
        Some(secret) => secret,
        None => {
            let secret = uuid::Uuid::new_v4().to_string();
            info!(secret = %secret, "dev mode: generated ephemeral webhook secret");
            secret
        }
    };

    // Stores
    let accounts: Arc<dyn AccountStore>;
    let workspaces: Arc<dyn WorkspaceStore>;
    let projects: Arc<dyn ProjectStore>;
    let invitations: Arc<dyn InvitationStore>;

    match &config.database_url {
        Some(url) => {
            info!("Connecting to Postgres");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await?;
            init_schema(&pool).await?;

            accounts = Arc::new(PostgresAccountStore::new(pool.clone()));
            workspaces = Arc::new(PostgresWorkspaceStore::new(pool.clone()));
            projects = Arc::new(PostgresProjectStore::new(pool.clone()));
            invitations = Arc::new(PostgresInvitationStore::new(pool));
        }
        None => {
            info!("dev mode: using in-memory stores");
            accounts = Arc::new(MemoryAccountStore::new());
            workspaces = Arc::new(MemoryWorkspaceStore::new());
            projects = Arc::new(MemoryProjectStore::new());
            invitations = Arc::new(MemoryInvitationStore::new());
        }
    }
    info!("Stores initialized");

    // Job sink
    let sink: Arc<dyn JobSink> = if config.dev_mode {
        Arc::new(InMemoryJobSink::new())
    } else {
        Arc::new(SqsJobSink::from_env().await)
    };
    info!(sink = sink.identifier(), "Job sink initialized");

    // Services
    let provisioning = Arc::new(ProvisioningService::new(accounts));
    let invitation_service = Arc::new(InvitationService::new(
        invitations,
        sink.clone(),
        config.notification_queue.clone(),
    ));
    let publishing = Arc::new(PublishingService::new(sink, config.publish_queue.clone()));

    let app_state = AppState { verifier };

    // Build the platform router
    let app = Router::new()
        .nest("/auth", auth_router())
        .nest(
            "/webhooks",
            webhooks_router(WebhooksState {
                webhook_secret: Arc::new(webhook_secret),
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
                projects,
                workspaces,
                publishing,
            }),
        )
        .route("/health", get(health_handler))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", PlatformApiDoc::openapi()))
        .layer(Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = format!("0.0.0.0:{}", config.port);
    info!("API server listening on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Castbridge Platform Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

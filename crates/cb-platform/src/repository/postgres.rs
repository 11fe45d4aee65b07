//! Postgres store backends.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::{Account, Invitation, Project, Workspace};

use super::{AccountStore, InvitationStore, ProjectStore, WorkspaceStore};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id TEXT PRIMARY KEY,
        subject TEXT NOT NULL UNIQUE,
        email TEXT,
        name TEXT,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL,
        last_event_id TEXT,
        last_event_at BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS workspaces (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_by TEXT NOT NULL,
        created_at BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        id TEXT PRIMARY KEY,
        workspace_id TEXT NOT NULL,
        name TEXT NOT NULL,
        revision BIGINT NOT NULL,
        created_by TEXT NOT NULL,
        created_at BIGINT NOT NULL,
        updated_at BIGINT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS invitations (
        id TEXT PRIMARY KEY,
        workspace_id TEXT NOT NULL,
        invitee_email TEXT NOT NULL,
        invited_by TEXT NOT NULL,
        created_at BIGINT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_projects_workspace ON projects(workspace_id)",
    "CREATE INDEX IF NOT EXISTS idx_invitations_workspace ON invitations(workspace_id)",
];

/// Create the platform tables if they do not exist.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

fn timestamp(row: &PgRow, column: &str) -> Result<DateTime<Utc>> {
    let millis: i64 = row.get(column);
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| anyhow::anyhow!("Invalid timestamp in column {}", column))
}

pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &PgRow) -> Result<Account> {
        Ok(Account {
            id: row.get("id"),
            subject: row.get("subject"),
            email: row.get("email"),
            name: row.get("name"),
            created_at: timestamp(row, "created_at")?,
            updated_at: timestamp(row, "updated_at")?,
            last_event_id: row.get("last_event_id"),
            last_event_at: timestamp(row, "last_event_at")?,
        })
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, subject, email, name, created_at, updated_at, last_event_id, last_event_at \
             FROM accounts WHERE subject = $1",
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::from_row(&r)).transpose()
    }

    async fn insert_if_absent(&self, account: &Account) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO accounts (id, subject, email, name, created_at, updated_at, last_event_id, last_event_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (subject) DO NOTHING",
        )
        .bind(&account.id)
        .bind(&account.subject)
        .bind(&account.email)
        .bind(&account.name)
        .bind(account.created_at.timestamp_millis())
        .bind(account.updated_at.timestamp_millis())
        .bind(&account.last_event_id)
        .bind(account.last_event_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_if_newer(&self, account: &Account) -> Result<bool> {
        // The staleness guard lives in SQL so concurrent deliveries cannot
        // interleave a lost update.
        let result = sqlx::query(
            "UPDATE accounts \
             SET email = $1, name = $2, updated_at = $3, last_event_id = $4, last_event_at = $5 \
             WHERE subject = $6 AND last_event_at <= $5",
        )
        .bind(&account.email)
        .bind(&account.name)
        .bind(account.updated_at.timestamp_millis())
        .bind(&account.last_event_id)
        .bind(account.last_event_at.timestamp_millis())
        .bind(&account.subject)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct PostgresWorkspaceStore {
    pool: PgPool,
}

impl PostgresWorkspaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkspaceStore for PostgresWorkspaceStore {
    async fn insert(&self, workspace: &Workspace) -> Result<()> {
        sqlx::query("INSERT INTO workspaces (id, name, created_by, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&workspace.id)
            .bind(&workspace.name)
            .bind(&workspace.created_by)
            .bind(workspace.created_at.timestamp_millis())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Workspace>> {
        let row = sqlx::query("SELECT id, name, created_by, created_at FROM workspaces WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| {
            Ok(Workspace {
                id: r.get("id"),
                name: r.get("name"),
                created_by: r.get("created_by"),
                created_at: timestamp(&r, "created_at")?,
            })
        })
        .transpose()
    }
}

pub struct PostgresProjectStore {
    pool: PgPool,
}

impl PostgresProjectStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn from_row(row: &PgRow) -> Result<Project> {
        Ok(Project {
            id: row.get("id"),
            workspace_id: row.get("workspace_id"),
            name: row.get("name"),
            revision: row.get("revision"),
            created_by: row.get("created_by"),
            created_at: timestamp(row, "created_at")?,
            updated_at: timestamp(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl ProjectStore for PostgresProjectStore {
    async fn insert(&self, project: &Project) -> Result<()> {
        sqlx::query(
            "INSERT INTO projects (id, workspace_id, name, revision, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&project.id)
        .bind(&project.workspace_id)
        .bind(&project.name)
        .bind(project.revision)
        .bind(&project.created_by)
        .bind(project.created_at.timestamp_millis())
        .bind(project.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Project>> {
        let row = sqlx::query(
            "SELECT id, workspace_id, name, revision, created_by, created_at, updated_at \
             FROM projects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Self::from_row(&r)).transpose()
    }

    async fn update(&self, project: &Project) -> Result<()> {
        sqlx::query("UPDATE projects SET name = $1, revision = $2, updated_at = $3 WHERE id = $4")
            .bind(&project.name)
            .bind(project.revision)
            .bind(project.updated_at.timestamp_millis())
            .bind(&project.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

pub struct PostgresInvitationStore {
    pool: PgPool,
}

impl PostgresInvitationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationStore for PostgresInvitationStore {
    async fn insert(&self, invitation: &Invitation) -> Result<()> {
        sqlx::query(
            "INSERT INTO invitations (id, workspace_id, invitee_email, invited_by, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&invitation.id)
        .bind(&invitation.workspace_id)
        .bind(&invitation.invitee_email)
        .bind(&invitation.invited_by)
        .bind(invitation.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<Invitation>> {
        let rows = sqlx::query(
            "SELECT id, workspace_id, invitee_email, invited_by, created_at \
             FROM invitations WHERE workspace_id = $1 ORDER BY created_at",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        let mut invitations = Vec::new();
        for row in rows {
            invitations.push(Invitation {
                id: row.get("id"),
                workspace_id: row.get("workspace_id"),
                invitee_email: row.get("invitee_email"),
                invited_by: row.get("invited_by"),
                created_at: timestamp(&row, "created_at")?,
            });
        }
        Ok(invitations)
    }
}

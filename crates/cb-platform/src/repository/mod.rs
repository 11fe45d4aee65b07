//! Store Layer
//!
//! Traits over the persistence collaborator, with Postgres (feature
//! `postgres`) and in-memory implementations. Handlers and services only
//! see the traits, so backends swap without touching the request path.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Account, Invitation, Project, Workspace};

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::{
    MemoryAccountStore, MemoryInvitationStore, MemoryProjectStore, MemoryWorkspaceStore,
};
#[cfg(feature = "postgres")]
pub use postgres::{
    init_schema, PostgresAccountStore, PostgresInvitationStore, PostgresProjectStore,
    PostgresWorkspaceStore,
};

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Account>>;

    /// Insert unless an account for the subject already exists.
    /// Returns whether a row was written.
    async fn insert_if_absent(&self, account: &Account) -> Result<bool>;

    /// Persist an updated account only if its `last_event_at` is at least
    /// as new as the stored one. Returns whether the update applied.
    async fn update_if_newer(&self, account: &Account) -> Result<bool>;
}

#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    async fn insert(&self, workspace: &Workspace) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Workspace>>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn insert(&self, project: &Project) -> Result<()>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Project>>;
    async fn update(&self, project: &Project) -> Result<()>;
}

#[async_trait]
pub trait InvitationStore: Send + Sync {
    async fn insert(&self, invitation: &Invitation) -> Result<()>;
    async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<Invitation>>;
}

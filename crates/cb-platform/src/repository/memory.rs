//! In-memory store backends for tests and dev mode.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{Account, Invitation, Project, Workspace};

use super::{AccountStore, InvitationStore, ProjectStore, WorkspaceStore};

/// Accounts keyed by identity-provider subject.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: DashMap<String, Account>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Account>> {
        Ok(self.inner.get(subject).map(|a| a.value().clone()))
    }

    async fn insert_if_absent(&self, account: &Account) -> Result<bool> {
        match self.inner.entry(account.subject.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Ok(false),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(account.clone());
                Ok(true)
            }
        }
    }

    async fn update_if_newer(&self, account: &Account) -> Result<bool> {
        match self.inner.get_mut(&account.subject) {
            Some(mut existing) if account.last_event_at >= existing.last_event_at => {
                *existing = account.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryWorkspaceStore {
    inner: DashMap<String, Workspace>,
}

impl MemoryWorkspaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl WorkspaceStore for MemoryWorkspaceStore {
    async fn insert(&self, workspace: &Workspace) -> Result<()> {
        self.inner.insert(workspace.id.clone(), workspace.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Workspace>> {
        Ok(self.inner.get(id).map(|w| w.value().clone()))
    }
}

#[derive(Default)]
pub struct MemoryProjectStore {
    inner: DashMap<String, Project>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn insert(&self, project: &Project) -> Result<()> {
        self.inner.insert(project.id.clone(), project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Project>> {
        Ok(self.inner.get(id).map(|p| p.value().clone()))
    }

    async fn update(&self, project: &Project) -> Result<()> {
        self.inner.insert(project.id.clone(), project.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryInvitationStore {
    inner: DashMap<String, Invitation>,
}

impl MemoryInvitationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl InvitationStore for MemoryInvitationStore {
    async fn insert(&self, invitation: &Invitation) -> Result<()> {
        self.inner.insert(invitation.id.clone(), invitation.clone());
        Ok(())
    }

    async fn list_for_workspace(&self, workspace_id: &str) -> Result<Vec<Invitation>> {
        Ok(self
            .inner
            .iter()
            .filter(|i| i.workspace_id == workspace_id)
            .map(|i| i.value().clone())
            .collect())
    }
}

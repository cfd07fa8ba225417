//! In-memory application store and audit trail.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::workflow::{
    domain::{ApplicationId, ApplicationStatus, AuditLogEntry, LoanApplication, UserId},
    ports::{
        ApplicationChange, ApplicationRepository, AuditLog, WorkflowRepositoryError,
        WorkflowRepositoryResult,
    },
};

/// Thread-safe in-memory store for applications and their audit trails.
///
/// Conditional writes compare the stored stamp and apply the change while
/// holding the write lock, so two writers computed from the same state can
/// never both succeed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowStore {
    state: Arc<RwLock<InMemoryWorkflowState>>,
}

#[derive(Debug, Default)]
struct InMemoryWorkflowState {
    applications: HashMap<ApplicationId, LoanApplication>,
    history: HashMap<ApplicationId, Vec<AuditLogEntry>>,
}

impl InMemoryWorkflowStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> WorkflowRepositoryResult<RwLockReadGuard<'_, InMemoryWorkflowState>> {
        self.state.read().map_err(|err| {
            WorkflowRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> WorkflowRepositoryResult<RwLockWriteGuard<'_, InMemoryWorkflowState>> {
        self.state.write().map_err(|err| {
            WorkflowRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn filtered(
        &self,
        predicate: impl Fn(&LoanApplication) -> bool,
    ) -> WorkflowRepositoryResult<Vec<LoanApplication>> {
        let state = self.read()?;
        let mut matching: Vec<LoanApplication> = state
            .applications
            .values()
            .filter(|application| predicate(application))
            .cloned()
            .collect();
        matching.sort_by_key(|application| (application.created_at(), application.id()));
        Ok(matching)
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryWorkflowStore {
    async fn insert(
        &self,
        application: &LoanApplication,
        entry: &AuditLogEntry,
    ) -> WorkflowRepositoryResult<()> {
        let mut state = self.write()?;
        if state.applications.contains_key(&application.id()) {
            return Err(WorkflowRepositoryError::DuplicateApplication(
                application.id(),
            ));
        }
        state
            .applications
            .insert(application.id(), application.clone());
        state
            .history
            .insert(application.id(), vec![entry.clone()]);
        Ok(())
    }

    async fn commit(&self, change: &ApplicationChange) -> WorkflowRepositoryResult<()> {
        let id = change.application.id();
        let mut state = self.write()?;
        let stored = state
            .applications
            .get(&id)
            .ok_or(WorkflowRepositoryError::NotFound(id))?;
        if stored.stamp() != change.expected {
            return Err(WorkflowRepositoryError::ConcurrentModification(id));
        }

        state.applications.insert(id, change.application.clone());
        state
            .history
            .entry(id)
            .or_default()
            .push(change.entry.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> WorkflowRepositoryResult<Option<LoanApplication>> {
        let state = self.read()?;
        Ok(state.applications.get(&id).cloned())
    }

    async fn find_unclaimed(
        &self,
        statuses: &[ApplicationStatus],
    ) -> WorkflowRepositoryResult<Vec<LoanApplication>> {
        self.filtered(|application| {
            application.lock().is_none() && statuses.contains(&application.status())
        })
    }

    async fn find_claimed_by(&self, user: UserId) -> WorkflowRepositoryResult<Vec<LoanApplication>> {
        self.filtered(|application| application.lock_holder() == Some(user))
    }

    async fn list_all(&self) -> WorkflowRepositoryResult<Vec<LoanApplication>> {
        self.filtered(|_| true)
    }
}

#[async_trait]
impl AuditLog for InMemoryWorkflowStore {
    async fn history_for(
        &self,
        application_id: ApplicationId,
    ) -> WorkflowRepositoryResult<Vec<AuditLogEntry>> {
        let state = self.read()?;
        Ok(state
            .history
            .get(&application_id)
            .cloned()
            .unwrap_or_default())
    }
}

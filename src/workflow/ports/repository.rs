//! Repository ports for application persistence and the audit trail.

use crate::workflow::domain::{
    ApplicationId, ApplicationStatus, AuditLogEntry, ConcurrencyStamp, LoanApplication, UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for workflow repository operations.
pub type WorkflowRepositoryResult<T> = Result<T, WorkflowRepositoryError>;

/// A conditional write of an application together with its audit entry.
///
/// The write succeeds only when the stored row still matches `expected`;
/// the application row and the entry are persisted together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationChange {
    /// The application state to persist.
    pub application: LoanApplication,
    /// Stamp of the state the change was computed from.
    pub expected: ConcurrencyStamp,
    /// Audit entry describing the change.
    pub entry: AuditLogEntry,
}

/// Application persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Stores a newly created application with its creation entry.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::DuplicateApplication`] when the
    /// identifier already exists.
    async fn insert(
        &self,
        application: &LoanApplication,
        entry: &AuditLogEntry,
    ) -> WorkflowRepositoryResult<()>;

    /// Persists a change when the stored row still matches its stamp.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::NotFound`] when the application does
    /// not exist and [`WorkflowRepositoryError::ConcurrentModification`] when
    /// the stored row no longer matches `change.expected`.
    async fn commit(&self, change: &ApplicationChange) -> WorkflowRepositoryResult<()>;

    /// Finds an application by identifier.
    ///
    /// Returns `None` when the application does not exist.
    async fn find_by_id(&self, id: ApplicationId)
    -> WorkflowRepositoryResult<Option<LoanApplication>>;

    /// Returns unclaimed applications in any of `statuses`.
    async fn find_unclaimed(
        &self,
        statuses: &[ApplicationStatus],
    ) -> WorkflowRepositoryResult<Vec<LoanApplication>>;

    /// Returns applications claimed by `user`.
    async fn find_claimed_by(&self, user: UserId) -> WorkflowRepositoryResult<Vec<LoanApplication>>;

    /// Returns every application.
    async fn list_all(&self) -> WorkflowRepositoryResult<Vec<LoanApplication>>;
}

/// Read access to the append-only audit trail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Returns the entries for `application_id`, oldest first.
    async fn history_for(
        &self,
        application_id: ApplicationId,
    ) -> WorkflowRepositoryResult<Vec<AuditLogEntry>>;
}

/// Errors returned by workflow repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WorkflowRepositoryError {
    /// An application with the same identifier already exists.
    #[error("duplicate application identifier: {0}")]
    DuplicateApplication(ApplicationId),

    /// The application was not found.
    #[error("application not found: {0}")]
    NotFound(ApplicationId),

    /// The stored row changed since it was read.
    #[error("application {0} was modified concurrently")]
    ConcurrentModification(ApplicationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkflowRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

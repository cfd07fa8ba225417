//! Service-level error type and its flat classification.

use crate::workflow::{
    domain::{ApplicationId, AuditReplayError, UserId, WorkflowDomainError},
    ports::WorkflowRepositoryError,
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Service-level errors for workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Workflow rules rejected the operation.
    #[error(transparent)]
    Domain(#[from] WorkflowDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] WorkflowRepositoryError),

    /// The acting user is unknown.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The stored audit trail does not replay.
    #[error("audit trail for application {application_id} is inconsistent: {source}")]
    Replay {
        /// Application whose trail failed to replay.
        application_id: ApplicationId,
        /// Replay failure.
        source: AuditReplayError,
    },
}

/// Result type for workflow service operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Flat classification of [`WorkflowError`] surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowErrorKind {
    /// Unknown application or user.
    NotFound,
    /// Wrong role for the current status.
    Unauthorized,
    /// Action not valid from the current status.
    IllegalTransition,
    /// Claimed by someone else.
    AlreadyLocked,
    /// The caller does not hold the claim.
    NotLockHolder,
    /// Mandatory comment missing.
    CommentRequired,
    /// Optimistic concurrency conflict; retry with fresh state.
    ConcurrentModification,
    /// Loan terms failed validation.
    InvalidTerms,
    /// Storage failure or corrupted state.
    Storage,
}

impl WorkflowErrorKind {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::IllegalTransition => "illegal_transition",
            Self::AlreadyLocked => "already_locked",
            Self::NotLockHolder => "not_lock_holder",
            Self::CommentRequired => "comment_required",
            Self::ConcurrentModification => "concurrent_modification",
            Self::InvalidTerms => "invalid_terms",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for WorkflowErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WorkflowError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> WorkflowErrorKind {
        match self {
            Self::Domain(err) => match err {
                WorkflowDomainError::Unauthorized { .. } => WorkflowErrorKind::Unauthorized,
                WorkflowDomainError::IllegalTransition { .. } => {
                    WorkflowErrorKind::IllegalTransition
                }
                WorkflowDomainError::AlreadyLocked { .. } => WorkflowErrorKind::AlreadyLocked,
                WorkflowDomainError::NotLockHolder { .. } => WorkflowErrorKind::NotLockHolder,
                WorkflowDomainError::CommentRequired(_) => WorkflowErrorKind::CommentRequired,
                WorkflowDomainError::InvalidTerms(_) => WorkflowErrorKind::InvalidTerms,
            },
            Self::Repository(err) => match err {
                WorkflowRepositoryError::NotFound(_) => WorkflowErrorKind::NotFound,
                WorkflowRepositoryError::ConcurrentModification(_) => {
                    WorkflowErrorKind::ConcurrentModification
                }
                WorkflowRepositoryError::DuplicateApplication(_)
                | WorkflowRepositoryError::Persistence(_) => WorkflowErrorKind::Storage,
            },
            Self::UserNotFound(_) => WorkflowErrorKind::NotFound,
            Self::Replay { .. } => WorkflowErrorKind::Storage,
        }
    }
}

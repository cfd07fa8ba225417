//! Error types for workflow rule violations and parsing.

use super::{ApplicationStatus, AuditAction, Role, UserId, WorkflowAction};
use thiserror::Error;

/// Workflow rules rejected the requested operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowDomainError {
    /// The actor's role may not act on the application in its current status.
    #[error("role '{role}' may not act on an application in status '{status}'")]
    Unauthorized {
        /// Role of the acting user.
        role: Role,
        /// Current status of the application.
        status: ApplicationStatus,
    },

    /// The action is not legal from the current status.
    #[error("action '{action}' is not legal from status '{status}'")]
    IllegalTransition {
        /// Current status of the application.
        status: ApplicationStatus,
        /// Requested action.
        action: AuditAction,
    },

    /// Another user holds the claim.
    #[error("application is already taken by user {holder}")]
    AlreadyLocked {
        /// Current holder of the claim.
        holder: UserId,
    },

    /// The acting user does not hold the claim.
    #[error("user {user} does not hold the claim on this application")]
    NotLockHolder {
        /// Acting user.
        user: UserId,
    },

    /// The action needs a non-blank comment.
    #[error("action '{0}' requires a comment")]
    CommentRequired(WorkflowAction),

    /// Loan terms failed validation.
    #[error("invalid loan terms: {0}")]
    InvalidTerms(String),
}

/// Error returned while parsing roles from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Error returned while parsing application statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown application status: {0}")]
pub struct ParseStatusError(pub String);

/// Error returned while parsing workflow or audit actions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown action: {0}")]
pub struct ParseActionError(pub String);

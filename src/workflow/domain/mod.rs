//! Domain model for the loan-origination workflow.
//!
//! Statuses, roles, the transition registry, the application aggregate and
//! its audit trail live here, free of any storage or transport concern.

mod action;
mod application;
mod assignment;
mod audit;
mod error;
mod ids;
pub mod registry;
mod role;
mod status;
mod user;

pub use action::WorkflowAction;
pub use application::{
    ConcurrencyStamp, LoanApplication, LoanTerms, MAX_RATE_BPS, MAX_TERM_MONTHS,
    PersistedApplicationData,
};
pub use assignment::{ApplicationLock, Assignee, RoleAssignments};
pub use audit::{
    Actor, AuditAction, AuditEntryParams, AuditLogEntry, AuditReplayError, ReplayedState, replay,
};
pub use error::{ParseActionError, ParseRoleError, ParseStatusError, WorkflowDomainError};
pub use ids::{ApplicationId, AuditEntryId, CustomerId, UserId};
pub use registry::Transition;
pub use role::{Role, RoleSlot};
pub use status::{ApplicationStatus, StatusTone};
pub use user::User;

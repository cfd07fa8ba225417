//! Port contracts for the workflow engine.
//!
//! Ports define infrastructure-agnostic interfaces used by workflow services.

pub mod directory;
pub mod repository;

pub use directory::UserDirectory;
pub use repository::{
    ApplicationChange, ApplicationRepository, AuditLog, WorkflowRepositoryError,
    WorkflowRepositoryResult,
};

#[cfg(test)]
pub use directory::MockUserDirectory;
#[cfg(test)]
pub use repository::{MockApplicationRepository, MockAuditLog};

//! User directory port.

use super::WorkflowRepositoryResult;
use crate::workflow::domain::{User, UserId};
use async_trait::async_trait;

/// Lookup of workflow users. Authentication happens elsewhere; the directory
/// only resolves an identifier to a name and role.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user is unknown.
    async fn find_user(&self, id: UserId) -> WorkflowRepositoryResult<Option<User>>;
}

//! In-memory user directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::workflow::{
    domain::{User, UserId},
    ports::{UserDirectory, WorkflowRepositoryError, WorkflowRepositoryResult},
};

/// Thread-safe in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory seeded with `users`.
    #[must_use]
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let seeded = users.into_iter().map(|user| (user.id(), user)).collect();
        Self {
            users: Arc::new(RwLock::new(seeded)),
        }
    }

    /// Adds or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::Persistence`] when the directory
    /// lock is poisoned.
    pub fn upsert(&self, user: User) -> WorkflowRepositoryResult<()> {
        let mut users = self.users.write().map_err(|err| {
            WorkflowRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        users.insert(user.id(), user);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, id: UserId) -> WorkflowRepositoryResult<Option<User>> {
        let users = self.users.read().map_err(|err| {
            WorkflowRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(users.get(&id).cloned())
    }
}

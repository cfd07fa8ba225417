//! Workflow users.

use super::{Role, UserId};
use serde::{Deserialize, Serialize};

/// A person acting on applications. The role is fixed per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    id: UserId,
    name: String,
    role: Role,
}

impl User {
    /// Creates a user with a fresh identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self::with_id(UserId::new(), name, role)
    }

    /// Creates a user with a known identifier.
    #[must_use]
    pub fn with_id(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

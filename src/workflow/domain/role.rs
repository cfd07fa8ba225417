//! User roles and the role slots they fill on an application.

use super::ParseRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role held by a workflow user. Fixed per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Data-entry staff who register and correct applications.
    StafInput,
    /// Credit administration reviewer.
    AdminKredit,
    /// Credit analyst.
    Analis,
    /// Decision maker.
    Pemutus,
    /// System administrator; may only force-release stuck claims.
    Admin,
}

impl Role {
    /// Every role, in stage order with `admin` last.
    pub const ALL: [Self; 5] = [
        Self::StafInput,
        Self::AdminKredit,
        Self::Analis,
        Self::Pemutus,
        Self::Admin,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StafInput => "staf_input",
            Self::AdminKredit => "admin_kredit",
            Self::Analis => "analis",
            Self::Pemutus => "pemutus",
            Self::Admin => "admin",
        }
    }

    /// Returns the display label rendered by collaborators.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StafInput => "Staf Input",
            Self::AdminKredit => "Admin Kredit",
            Self::Analis => "Analis",
            Self::Pemutus => "Pemutus",
            Self::Admin => "Administrator",
        }
    }

    /// Returns the application slot this role fills, if any.
    #[must_use]
    pub const fn slot(self) -> Option<RoleSlot> {
        match self {
            Self::StafInput => Some(RoleSlot::StafInput),
            Self::AdminKredit => Some(RoleSlot::AdminKredit),
            Self::Analis => Some(RoleSlot::Analis),
            Self::Pemutus => Some(RoleSlot::Pemutus),
            Self::Admin => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "staf_input" => Ok(Self::StafInput),
            "admin_kredit" => Ok(Self::AdminKredit),
            "analis" => Ok(Self::Analis),
            "pemutus" => Ok(Self::Pemutus),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Per-application assignee slot, one for each stage-owning role.
///
/// Slots are ordered by stage so "later than" comparisons follow the
/// workflow sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleSlot {
    /// Data-entry slot.
    StafInput,
    /// Credit administration slot.
    AdminKredit,
    /// Analyst slot.
    Analis,
    /// Decision-maker slot.
    Pemutus,
}

impl RoleSlot {
    /// Every slot in stage order.
    pub const ALL: [Self; 4] = [Self::StafInput, Self::AdminKredit, Self::Analis, Self::Pemutus];

    /// Returns the role that fills this slot.
    #[must_use]
    pub const fn role(self) -> Role {
        match self {
            Self::StafInput => Role::StafInput,
            Self::AdminKredit => Role::AdminKredit,
            Self::Analis => Role::Analis,
            Self::Pemutus => Role::Pemutus,
        }
    }
}

//! Role-slot assignments and the exclusive application lock.

use super::{RoleSlot, User, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor of record for one role slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    /// Assigned user.
    pub user_id: UserId,
    /// Display name captured when the slot was stamped.
    pub name: String,
}

impl Assignee {
    /// Captures the assignee details of `user`.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id(),
            name: user.name().to_owned(),
        }
    }
}

/// Current assignee per role slot. Each slot is empty until claimed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignments {
    staf_input: Option<Assignee>,
    admin_kredit: Option<Assignee>,
    analis: Option<Assignee>,
    pemutus: Option<Assignee>,
}

impl RoleAssignments {
    /// Creates assignments with every slot empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the assignee of `slot`, if any.
    #[must_use]
    pub const fn get(&self, slot: RoleSlot) -> Option<&Assignee> {
        match slot {
            RoleSlot::StafInput => self.staf_input.as_ref(),
            RoleSlot::AdminKredit => self.admin_kredit.as_ref(),
            RoleSlot::Analis => self.analis.as_ref(),
            RoleSlot::Pemutus => self.pemutus.as_ref(),
        }
    }

    /// Stamps `assignee` into `slot`, replacing any previous assignee.
    pub fn assign(&mut self, slot: RoleSlot, assignee: Assignee) {
        *self.slot_mut(slot) = Some(assignee);
    }

    /// Empties every slot in `slots`.
    pub fn clear(&mut self, slots: &[RoleSlot]) {
        for slot in slots {
            *self.slot_mut(*slot) = None;
        }
    }

    /// Iterates over filled slots in stage order.
    pub fn iter(&self) -> impl Iterator<Item = (RoleSlot, &Assignee)> {
        RoleSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|assignee| (slot, assignee)))
    }

    const fn slot_mut(&mut self, slot: RoleSlot) -> &mut Option<Assignee> {
        match slot {
            RoleSlot::StafInput => &mut self.staf_input,
            RoleSlot::AdminKredit => &mut self.admin_kredit,
            RoleSlot::Analis => &mut self.analis,
            RoleSlot::Pemutus => &mut self.pemutus,
        }
    }
}

/// Exclusive claim on an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationLock {
    /// User holding the claim.
    pub holder: UserId,
    /// Display name of the holder.
    pub holder_name: String,
    /// When the claim was acquired.
    pub acquired_at: DateTime<Utc>,
}

impl ApplicationLock {
    /// Creates a lock held by `user` from `acquired_at`.
    #[must_use]
    pub fn held_by(user: &User, acquired_at: DateTime<Utc>) -> Self {
        Self {
            holder: user.id(),
            holder_name: user.name().to_owned(),
            acquired_at,
        }
    }
}

//! Immutable audit trail entries and history replay.

use super::{
    ApplicationId, ApplicationStatus, Assignee, AuditEntryId, ParseActionError, Role,
    RoleAssignments, User, UserId, WorkflowAction, registry,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of state change recorded in the audit trail.
///
/// Serialized as a flat string: `created`, `take`, `release`,
/// `force_release`, or one of the workflow action names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AuditAction {
    /// Application registered by data entry.
    Created,
    /// Exclusive claim acquired.
    Take,
    /// Claim released by its holder.
    Release,
    /// Claim cleared by an administrator.
    ForceRelease,
    /// Workflow transition requested through `apply`.
    Workflow(WorkflowAction),
}

impl AuditAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Take => "take",
            Self::Release => "release",
            Self::ForceRelease => "force_release",
            Self::Workflow(action) => action.as_str(),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AuditAction {
    type Error = ParseActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "take" => Ok(Self::Take),
            "release" => Ok(Self::Release),
            "force_release" => Ok(Self::ForceRelease),
            _ => WorkflowAction::try_from(value).map(Self::Workflow),
        }
    }
}

impl TryFrom<String> for AuditAction {
    type Error = ParseActionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<AuditAction> for String {
    fn from(value: AuditAction) -> Self {
        value.as_str().to_owned()
    }
}

/// Who performed an audited action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Acting user.
    pub user_id: UserId,
    /// Display name at the time of the action.
    pub name: String,
    /// Role at the time of the action.
    pub role: Role,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id(),
            name: user.name().to_owned(),
            role: user.role(),
        }
    }
}

/// Parameters for recording an audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntryParams {
    /// Application the entry belongs to.
    pub application_id: ApplicationId,
    /// Acting user.
    pub actor: Actor,
    /// Recorded action.
    pub action: AuditAction,
    /// Status before the change.
    pub status_before: ApplicationStatus,
    /// Status after the change.
    pub status_after: ApplicationStatus,
    /// Optional free-text comment.
    pub comment: Option<String>,
}

/// One immutable record in an application's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    id: AuditEntryId,
    application_id: ApplicationId,
    actor: Actor,
    action: AuditAction,
    status_before: ApplicationStatus,
    status_after: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Records a new entry stamped with the clock's current time.
    #[must_use]
    pub fn new(params: AuditEntryParams, clock: &impl Clock) -> Self {
        Self::from_persisted(AuditEntryId::new(), params, clock.utc())
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(
        id: AuditEntryId,
        params: AuditEntryParams,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        let AuditEntryParams {
            application_id,
            actor,
            action,
            status_before,
            status_after,
            comment,
        } = params;
        Self {
            id,
            application_id,
            actor,
            action,
            status_before,
            status_after,
            comment,
            recorded_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> AuditEntryId {
        self.id
    }

    /// Returns the application identifier.
    #[must_use]
    pub const fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Returns the recorded action.
    #[must_use]
    pub const fn action(&self) -> AuditAction {
        self.action
    }

    /// Returns the status before the change.
    #[must_use]
    pub const fn status_before(&self) -> ApplicationStatus {
        self.status_before
    }

    /// Returns the status after the change.
    #[must_use]
    pub const fn status_after(&self) -> ApplicationStatus {
        self.status_after
    }

    /// Returns the comment, if one was given.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns when the entry was recorded.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

/// Workflow state reconstructed from an audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayedState {
    /// Status after the last entry.
    pub status: ApplicationStatus,
    /// Role-slot assignments after the last entry.
    pub assignments: RoleAssignments,
    /// Holder of the claim after the last entry, if any.
    pub lock_holder: Option<UserId>,
}

/// Errors returned when an audit trail cannot be replayed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditReplayError {
    /// The trail has no entries.
    #[error("audit trail is empty")]
    EmptyHistory,

    /// The first entry is not the creation record.
    #[error("audit trail starts with '{0}' instead of 'created'")]
    MissingCreation(AuditAction),

    /// An entry does not follow on from the status reached so far.
    #[error("audit entry {entry} starts from '{found}' but the trail is at '{expected}'")]
    StatusMismatch {
        /// Offending entry.
        entry: AuditEntryId,
        /// Status reached by the preceding entries.
        expected: ApplicationStatus,
        /// Status recorded on the entry.
        found: ApplicationStatus,
    },
}

/// Folds an audit trail, oldest first, into the workflow state it describes.
///
/// # Errors
///
/// Returns [`AuditReplayError`] when the trail is empty, does not start with
/// a creation record, or contains an entry that does not continue from the
/// status reached by its predecessors.
pub fn replay(entries: &[AuditLogEntry]) -> Result<ReplayedState, AuditReplayError> {
    let (first, rest) = entries
        .split_first()
        .ok_or(AuditReplayError::EmptyHistory)?;
    if first.action != AuditAction::Created {
        return Err(AuditReplayError::MissingCreation(first.action));
    }

    let mut state = ReplayedState {
        status: first.status_after,
        assignments: RoleAssignments::new(),
        lock_holder: None,
    };
    if let Some(slot) = first.actor.role.slot() {
        state.assignments.assign(slot, assignee_of(&first.actor));
    }

    for entry in rest {
        if entry.status_before != state.status {
            return Err(AuditReplayError::StatusMismatch {
                entry: entry.id,
                expected: state.status,
                found: entry.status_before,
            });
        }
        apply_entry(&mut state, entry);
    }

    Ok(state)
}

fn apply_entry(state: &mut ReplayedState, entry: &AuditLogEntry) {
    match entry.action {
        AuditAction::Created => {}
        AuditAction::Take => claim(state, entry),
        AuditAction::Release | AuditAction::ForceRelease => state.lock_holder = None,
        AuditAction::Workflow(action)
            if registry::claim_action(entry.status_before) == Some(action) =>
        {
            claim(state, entry);
        }
        AuditAction::Workflow(action) => {
            if action == WorkflowAction::Return {
                state
                    .assignments
                    .clear(&registry::slots_after(entry.status_after));
            }
            if registry::is_hand_off(entry.status_before, entry.status_after) {
                state.lock_holder = None;
            }
        }
    }
    state.status = entry.status_after;
}

fn claim(state: &mut ReplayedState, entry: &AuditLogEntry) {
    if let Some(slot) = registry::slot_for(entry.status_before) {
        state.assignments.assign(slot, assignee_of(&entry.actor));
    }
    state.lock_holder = Some(entry.actor.user_id);
}

fn assignee_of(actor: &Actor) -> Assignee {
    Assignee {
        user_id: actor.user_id,
        name: actor.name.clone(),
    }
}

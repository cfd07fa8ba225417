//! Status registry: the single source of truth for which role acts in each
//! status and which actions lead where.
//!
//! Every rule is derived from [`TRANSITIONS`], so the table rendered for
//! collaborators and the checks enforced by the engine cannot drift apart.

use super::{ApplicationStatus, AuditAction, Role, RoleSlot, WorkflowAction, WorkflowDomainError};
use serde::Serialize;

/// One legal edge of the workflow state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    /// Status the action is requested from.
    pub from: ApplicationStatus,
    /// Requested action.
    pub action: WorkflowAction,
    /// Resulting status.
    pub to: ApplicationStatus,
}

const fn edge(
    from: ApplicationStatus,
    action: WorkflowAction,
    to: ApplicationStatus,
) -> Transition {
    Transition { from, action, to }
}

/// The complete transition table.
pub const TRANSITIONS: [Transition; 10] = [
    edge(
        ApplicationStatus::Diajukan,
        WorkflowAction::Submit,
        ApplicationStatus::Diperiksa,
    ),
    edge(
        ApplicationStatus::Diperiksa,
        WorkflowAction::Approve,
        ApplicationStatus::Dianalisis,
    ),
    edge(
        ApplicationStatus::Diperiksa,
        WorkflowAction::Return,
        ApplicationStatus::Dikembalikan,
    ),
    edge(
        ApplicationStatus::Diperiksa,
        WorkflowAction::Reject,
        ApplicationStatus::Ditolak,
    ),
    edge(
        ApplicationStatus::Dikembalikan,
        WorkflowAction::Resubmit,
        ApplicationStatus::Diajukan,
    ),
    edge(
        ApplicationStatus::Dianalisis,
        WorkflowAction::Complete,
        ApplicationStatus::SiapDiputuskan,
    ),
    edge(
        ApplicationStatus::Dianalisis,
        WorkflowAction::Return,
        ApplicationStatus::Diperiksa,
    ),
    edge(
        ApplicationStatus::Dianalisis,
        WorkflowAction::Reject,
        ApplicationStatus::Ditolak,
    ),
    edge(
        ApplicationStatus::SiapDiputuskan,
        WorkflowAction::Approve,
        ApplicationStatus::Disetujui,
    ),
    edge(
        ApplicationStatus::SiapDiputuskan,
        WorkflowAction::Reject,
        ApplicationStatus::Ditolak,
    ),
];

/// Returns the full transition table.
#[must_use]
pub const fn transitions() -> &'static [Transition] {
    &TRANSITIONS
}

/// Returns the role whose turn it is in `status`, or `None` for terminal
/// statuses.
///
/// A submitted application (`diajukan`) belongs to credit administration:
/// data entry submits by creating it.
#[must_use]
pub const fn role_for(status: ApplicationStatus) -> Option<Role> {
    match status {
        ApplicationStatus::Diajukan | ApplicationStatus::Diperiksa => Some(Role::AdminKredit),
        ApplicationStatus::Dikembalikan => Some(Role::StafInput),
        ApplicationStatus::Dianalisis => Some(Role::Analis),
        ApplicationStatus::SiapDiputuskan => Some(Role::Pemutus),
        ApplicationStatus::Disetujui | ApplicationStatus::Ditolak => None,
    }
}

/// Returns the actions that are legal from `status`, in table order.
#[must_use]
pub fn legal_actions(status: ApplicationStatus) -> Vec<WorkflowAction> {
    TRANSITIONS
        .iter()
        .filter(|transition| transition.from == status)
        .map(|transition| transition.action)
        .collect()
}

/// Returns `true` when `action` is legal from `status`.
#[must_use]
pub fn is_legal(status: ApplicationStatus, action: WorkflowAction) -> bool {
    TRANSITIONS
        .iter()
        .any(|transition| transition.from == status && transition.action == action)
}

/// Computes the status reached by applying `action` in `status`.
///
/// # Errors
///
/// Returns [`WorkflowDomainError::IllegalTransition`] when the action is not
/// legal from `status`.
pub fn next_status(
    status: ApplicationStatus,
    action: WorkflowAction,
) -> Result<ApplicationStatus, WorkflowDomainError> {
    TRANSITIONS
        .iter()
        .find(|transition| transition.from == status && transition.action == action)
        .map(|transition| transition.to)
        .ok_or(WorkflowDomainError::IllegalTransition {
            status,
            action: AuditAction::Workflow(action),
        })
}

/// Returns the action implicitly performed when the stage owner takes an
/// application in `status`.
///
/// Taking a submitted application starts the credit-administration review.
/// The same action may also be applied directly, without a prior claim.
#[must_use]
pub const fn claim_action(status: ApplicationStatus) -> Option<WorkflowAction> {
    match status {
        ApplicationStatus::Diajukan => Some(WorkflowAction::Submit),
        _ => None,
    }
}

/// Returns the slot stamped when the owner of `status` acts on it.
#[must_use]
pub const fn slot_for(status: ApplicationStatus) -> Option<RoleSlot> {
    match role_for(status) {
        Some(role) => role.slot(),
        None => None,
    }
}

/// Returns the slots belonging to stages after the stage of `status`.
///
/// Returning an application to `status` clears exactly these slots.
#[must_use]
pub fn slots_after(status: ApplicationStatus) -> Vec<RoleSlot> {
    slot_for(status).map_or_else(Vec::new, |owner| {
        RoleSlot::ALL
            .into_iter()
            .filter(|slot| *slot > owner)
            .collect()
    })
}

/// Returns `true` when moving from `from` to `to` passes the application to a
/// different role, or ends the workflow.
#[must_use]
pub fn is_hand_off(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    to.is_terminal() || role_for(from) != role_for(to)
}

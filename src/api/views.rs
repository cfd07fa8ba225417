//! Response payloads rendered by the HTTP adapter.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::workflow::domain::{
    ApplicationId, ApplicationStatus, AuditEntryId, AuditLogEntry, CustomerId, LoanApplication,
    Role, RoleSlot, StatusTone, UserId, WorkflowAction, registry,
};

/// Display name of whoever fills each role slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssigneeNames {
    /// Data-entry staff who created or resubmitted the application.
    pub staf_input: Option<String>,
    /// Credit administrator who checked it.
    pub admin_kredit: Option<String>,
    /// Analyst who analysed it.
    pub analis: Option<String>,
    /// Decision maker.
    pub pemutus: Option<String>,
}

/// A loan application as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationView {
    /// Application identifier.
    pub id: ApplicationId,
    /// Customer reference.
    pub customer_id: CustomerId,
    /// Current status.
    pub status: ApplicationStatus,
    /// Human-readable status label.
    pub status_label: &'static str,
    /// Display tone of the status.
    pub status_tone: StatusTone,
    /// Role whose turn it is, if not terminal.
    pub active_role: Option<Role>,
    /// Requested amount in minor currency units.
    pub amount: u64,
    /// Stated purpose.
    pub purpose: String,
    /// Term in months.
    pub term_months: u16,
    /// Annual rate in basis points.
    pub rate_bps: u32,
    /// Assignee per role slot.
    pub assignees: AssigneeNames,
    /// Claim holder identifier.
    pub locked_by_id: Option<UserId>,
    /// Claim holder display name.
    pub locked_by: Option<String>,
    /// When the claim was taken.
    pub locked_at: Option<DateTime<Utc>>,
    /// Row version to echo back as `expected_version`.
    pub version: u64,
    /// Actions legal from the current status.
    pub legal_actions: Vec<WorkflowAction>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<&LoanApplication> for ApplicationView {
    fn from(application: &LoanApplication) -> Self {
        let assignments = application.assignments();
        let name_in = |slot| assignments.get(slot).map(|assignee| assignee.name.clone());
        let lock = application.lock();
        let terms = application.terms();
        Self {
            id: application.id(),
            customer_id: application.customer_id(),
            status: application.status(),
            status_label: application.status().label(),
            status_tone: application.status().tone(),
            active_role: application.active_role(),
            amount: terms.amount(),
            purpose: terms.purpose().to_owned(),
            term_months: terms.term_months(),
            rate_bps: terms.rate_bps(),
            assignees: AssigneeNames {
                staf_input: name_in(RoleSlot::StafInput),
                admin_kredit: name_in(RoleSlot::AdminKredit),
                analis: name_in(RoleSlot::Analis),
                pemutus: name_in(RoleSlot::Pemutus),
            },
            locked_by_id: lock.map(|held| held.holder),
            locked_by: lock.map(|held| held.holder_name.clone()),
            locked_at: lock.map(|held| held.acquired_at),
            version: application.version(),
            legal_actions: application.legal_actions(),
            created_at: application.created_at(),
            updated_at: application.updated_at(),
        }
    }
}

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntryView {
    /// Entry identifier.
    pub id: AuditEntryId,
    /// Acting user.
    pub user_id: UserId,
    /// Acting user's display name.
    pub user_name: String,
    /// Acting user's role.
    pub role: Role,
    /// Recorded action.
    pub action: String,
    /// Status before the action.
    pub from: ApplicationStatus,
    /// Status after the action.
    pub to: ApplicationStatus,
    /// Optional comment.
    pub comment: Option<String>,
    /// When the entry was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl From<&AuditLogEntry> for AuditEntryView {
    fn from(entry: &AuditLogEntry) -> Self {
        let actor = entry.actor();
        Self {
            id: entry.id(),
            user_id: actor.user_id,
            user_name: actor.name.clone(),
            role: actor.role,
            action: entry.action().to_string(),
            from: entry.status_before(),
            to: entry.status_after(),
            comment: entry.comment().map(str::to_owned),
            recorded_at: entry.recorded_at(),
        }
    }
}

/// Registry row describing one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRuleView {
    /// Status.
    pub status: ApplicationStatus,
    /// Human-readable label.
    pub label: &'static str,
    /// Display tone.
    pub tone: StatusTone,
    /// Owning role, if not terminal.
    pub role: Option<Role>,
    /// Actions legal from this status.
    pub legal_actions: Vec<WorkflowAction>,
    /// Whether the status is terminal.
    pub terminal: bool,
}

/// The transition registry rendered for clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulesView {
    /// One row per status, in workflow order.
    pub statuses: Vec<StatusRuleView>,
    /// Every legal transition.
    pub transitions: Vec<registry::Transition>,
}

impl RulesView {
    /// Renders the registry.
    #[must_use]
    pub fn current() -> Self {
        let statuses = ApplicationStatus::ALL
            .into_iter()
            .map(|status| StatusRuleView {
                status,
                label: status.label(),
                tone: status.tone(),
                role: registry::role_for(status),
                legal_actions: registry::legal_actions(status),
                terminal: status.is_terminal(),
            })
            .collect();
        Self {
            statuses,
            transitions: registry::transitions().to_vec(),
        }
    }
}

/// Count of applications in one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCountView {
    /// Status.
    pub status: ApplicationStatus,
    /// Human-readable label.
    pub label: &'static str,
    /// Number of applications.
    pub count: usize,
}

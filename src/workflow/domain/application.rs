//! Loan application aggregate root.
//!
//! Every mutating method validates first and only then changes state, so a
//! rejected operation leaves the aggregate untouched. Each successful
//! mutation bumps the row version and returns the audit entry describing it.

use super::{
    Actor, ApplicationId, ApplicationLock, ApplicationStatus, Assignee, AuditAction,
    AuditEntryParams, AuditLogEntry, CustomerId, Role, RoleAssignments, User, UserId,
    WorkflowAction, WorkflowDomainError, registry,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Longest accepted loan term, in months.
pub const MAX_TERM_MONTHS: u16 = 360;

/// Highest accepted annual rate, in basis points.
pub const MAX_RATE_BPS: u32 = 10_000;

/// Requested loan terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    amount: u64,
    purpose: String,
    term_months: u16,
    rate_bps: u32,
}

impl LoanTerms {
    /// Creates validated loan terms.
    ///
    /// `amount` is in minor currency units and `rate_bps` is the annual rate
    /// in basis points.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::InvalidTerms`] when the amount is zero,
    /// the purpose is blank, the term is outside `1..=360` months, or the
    /// rate exceeds 100%.
    pub fn new(
        amount: u64,
        purpose: impl Into<String>,
        term_months: u16,
        rate_bps: u32,
    ) -> Result<Self, WorkflowDomainError> {
        let raw_purpose = purpose.into();
        let trimmed_purpose = raw_purpose.trim();
        if amount == 0 {
            return Err(invalid_terms("amount must be greater than zero"));
        }
        if trimmed_purpose.is_empty() {
            return Err(invalid_terms("purpose must not be empty"));
        }
        if term_months == 0 || term_months > MAX_TERM_MONTHS {
            return Err(invalid_terms("term must be between 1 and 360 months"));
        }
        if rate_bps > MAX_RATE_BPS {
            return Err(invalid_terms("rate must not exceed 10000 basis points"));
        }
        Ok(Self {
            amount,
            purpose: trimmed_purpose.to_owned(),
            term_months,
            rate_bps,
        })
    }

    /// Returns the requested amount in minor currency units.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.amount
    }

    /// Returns the stated purpose of the loan.
    #[must_use]
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    /// Returns the term in months.
    #[must_use]
    pub const fn term_months(&self) -> u16 {
        self.term_months
    }

    /// Returns the annual rate in basis points.
    #[must_use]
    pub const fn rate_bps(&self) -> u32 {
        self.rate_bps
    }
}

fn invalid_terms(reason: &str) -> WorkflowDomainError {
    WorkflowDomainError::InvalidTerms(reason.to_owned())
}

/// The tuple a conditional write compares against the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConcurrencyStamp {
    /// Status when the application was read.
    pub status: ApplicationStatus,
    /// Claim holder when the application was read.
    pub lock_holder: Option<UserId>,
    /// Row version when the application was read.
    pub version: u64,
}

/// Parameter object for reconstructing a persisted application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedApplicationData {
    /// Persisted identifier.
    pub id: ApplicationId,
    /// Persisted customer reference.
    pub customer_id: CustomerId,
    /// Persisted loan terms.
    pub terms: LoanTerms,
    /// Persisted status.
    pub status: ApplicationStatus,
    /// Persisted role-slot assignments.
    pub assignments: RoleAssignments,
    /// Persisted claim, if any.
    pub lock: Option<ApplicationLock>,
    /// Persisted row version.
    pub version: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Loan application aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    id: ApplicationId,
    customer_id: CustomerId,
    terms: LoanTerms,
    status: ApplicationStatus,
    assignments: RoleAssignments,
    lock: Option<ApplicationLock>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LoanApplication {
    /// Registers a new application submitted by data entry.
    ///
    /// The application starts in [`ApplicationStatus::Diajukan`] with the
    /// creator stamped into the `staf_input` slot.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::Unauthorized`] when the creator is not
    /// data-entry staff.
    pub fn submit(
        customer_id: CustomerId,
        terms: LoanTerms,
        creator: &User,
        clock: &impl Clock,
    ) -> Result<(Self, AuditLogEntry), WorkflowDomainError> {
        let status = ApplicationStatus::Diajukan;
        if creator.role() != Role::StafInput {
            return Err(WorkflowDomainError::Unauthorized {
                role: creator.role(),
                status,
            });
        }

        let timestamp = clock.utc();
        let mut assignments = RoleAssignments::new();
        if let Some(slot) = creator.role().slot() {
            assignments.assign(slot, Assignee::from_user(creator));
        }
        let application = Self {
            id: ApplicationId::new(),
            customer_id,
            terms,
            status,
            assignments,
            lock: None,
            version: 1,
            created_at: timestamp,
            updated_at: timestamp,
        };
        let entry = application.audit_entry(creator, AuditAction::Created, status, None, clock);
        Ok((application, entry))
    }

    /// Reconstructs an application from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedApplicationData) -> Self {
        Self {
            id: data.id,
            customer_id: data.customer_id,
            terms: data.terms,
            status: data.status,
            assignments: data.assignments,
            lock: data.lock,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the application identifier.
    #[must_use]
    pub const fn id(&self) -> ApplicationId {
        self.id
    }

    /// Returns the customer the application belongs to.
    #[must_use]
    pub const fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the requested loan terms.
    #[must_use]
    pub const fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> ApplicationStatus {
        self.status
    }

    /// Returns the role-slot assignments.
    #[must_use]
    pub const fn assignments(&self) -> &RoleAssignments {
        &self.assignments
    }

    /// Returns the current claim, if any.
    #[must_use]
    pub const fn lock(&self) -> Option<&ApplicationLock> {
        self.lock.as_ref()
    }

    /// Returns the row version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the role whose turn it is, or `None` once terminal.
    #[must_use]
    pub const fn active_role(&self) -> Option<Role> {
        registry::role_for(self.status)
    }

    /// Returns the actions legal from the current status.
    #[must_use]
    pub fn legal_actions(&self) -> Vec<WorkflowAction> {
        registry::legal_actions(self.status)
    }

    /// Returns the holder of the claim, if any.
    #[must_use]
    pub fn lock_holder(&self) -> Option<UserId> {
        self.lock.as_ref().map(|lock| lock.holder)
    }

    /// Returns the stamp a conditional write of this state must match.
    #[must_use]
    pub fn stamp(&self) -> ConcurrencyStamp {
        ConcurrencyStamp {
            status: self.status,
            lock_holder: self.lock_holder(),
            version: self.version,
        }
    }

    /// Claims the application for `user`.
    ///
    /// Returns `Ok(None)` without changing anything when `user` already
    /// holds the claim. Taking a submitted application starts the review and
    /// moves it to [`ApplicationStatus::Diperiksa`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::IllegalTransition`] for terminal
    /// statuses, [`WorkflowDomainError::Unauthorized`] when the user's role
    /// does not own the current status, and
    /// [`WorkflowDomainError::AlreadyLocked`] when another user holds the
    /// claim.
    pub fn take(
        &mut self,
        user: &User,
        clock: &impl Clock,
    ) -> Result<Option<AuditLogEntry>, WorkflowDomainError> {
        let before = self.status;
        if before.is_terminal() {
            return Err(WorkflowDomainError::IllegalTransition {
                status: before,
                action: AuditAction::Take,
            });
        }
        self.ensure_stage_owner(user)?;
        if let Some(holder) = self.lock_holder() {
            if holder == user.id() {
                return Ok(None);
            }
            return Err(WorkflowDomainError::AlreadyLocked { holder });
        }

        let after = match registry::claim_action(before) {
            Some(action) => registry::next_status(before, action)?,
            None => before,
        };
        Ok(Some(self.claim(user, AuditAction::Take, after, None, clock)))
    }

    /// Releases the claim held by `user`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::NotLockHolder`] when `user` does not
    /// hold the claim.
    pub fn release(
        &mut self,
        user: &User,
        clock: &impl Clock,
    ) -> Result<AuditLogEntry, WorkflowDomainError> {
        self.ensure_lock_holder(user)?;
        self.lock = None;
        self.touch(clock);
        Ok(self.audit_entry(user, AuditAction::Release, self.status, None, clock))
    }

    /// Clears any claim unconditionally on behalf of an administrator.
    ///
    /// Returns `Ok(None)` when there was no claim to clear.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::Unauthorized`] when `admin` does not
    /// have the administrator role.
    pub fn force_release(
        &mut self,
        admin: &User,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> Result<Option<AuditLogEntry>, WorkflowDomainError> {
        if admin.role() != Role::Admin {
            return Err(WorkflowDomainError::Unauthorized {
                role: admin.role(),
                status: self.status,
            });
        }
        if self.lock.is_none() {
            return Ok(None);
        }
        self.lock = None;
        self.touch(clock);
        Ok(Some(self.audit_entry(
            admin,
            AuditAction::ForceRelease,
            self.status,
            normalize_comment(comment),
            clock,
        )))
    }

    /// Applies a workflow action on behalf of the claim holder.
    ///
    /// Returning clears every slot after the returned-to stage. The claim is
    /// released whenever the application moves to another role or ends.
    ///
    /// The action that starts a stage's review (see
    /// [`registry::claim_action`]) needs no prior claim: applying it claims
    /// the application for `user` exactly as [`Self::take`] would, recorded
    /// under the workflow action instead of a take.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::IllegalTransition`] for terminal
    /// statuses or actions not legal from the current status,
    /// [`WorkflowDomainError::NotLockHolder`] when `user` does not hold the
    /// claim, [`WorkflowDomainError::AlreadyLocked`] when another user holds
    /// the claim a starting action would take,
    /// [`WorkflowDomainError::Unauthorized`] when the user's role does not
    /// own the current status, and [`WorkflowDomainError::CommentRequired`]
    /// when a mandatory comment is missing.
    pub fn apply(
        &mut self,
        user: &User,
        action: WorkflowAction,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> Result<AuditLogEntry, WorkflowDomainError> {
        let before = self.status;
        if before.is_terminal() {
            return Err(WorkflowDomainError::IllegalTransition {
                status: before,
                action: AuditAction::Workflow(action),
            });
        }
        if registry::claim_action(before) == Some(action) {
            return self.start_review(user, action, comment, clock);
        }
        self.ensure_lock_holder(user)?;
        self.ensure_stage_owner(user)?;
        let after = registry::next_status(before, action)?;
        let normalized = normalize_comment(comment);
        if action.requires_comment() && normalized.is_none() {
            return Err(WorkflowDomainError::CommentRequired(action));
        }

        if action == WorkflowAction::Return {
            self.assignments.clear(&registry::slots_after(after));
        }
        if registry::is_hand_off(before, after) {
            self.lock = None;
        }
        self.status = after;
        self.touch(clock);
        Ok(self.audit_entry(
            user,
            AuditAction::Workflow(action),
            before,
            normalized,
            clock,
        ))
    }

    fn start_review(
        &mut self,
        user: &User,
        action: WorkflowAction,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> Result<AuditLogEntry, WorkflowDomainError> {
        self.ensure_stage_owner(user)?;
        if let Some(holder) = self.lock_holder().filter(|holder| *holder != user.id()) {
            return Err(WorkflowDomainError::AlreadyLocked { holder });
        }
        let after = registry::next_status(self.status, action)?;
        let normalized = normalize_comment(comment);
        if action.requires_comment() && normalized.is_none() {
            return Err(WorkflowDomainError::CommentRequired(action));
        }
        Ok(self.claim(user, AuditAction::Workflow(action), after, normalized, clock))
    }

    /// Stamps the current stage's slot, takes the claim and moves to `after`.
    fn claim(
        &mut self,
        user: &User,
        recorded: AuditAction,
        after: ApplicationStatus,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> AuditLogEntry {
        let before = self.status;
        if let Some(slot) = registry::slot_for(before) {
            self.assignments.assign(slot, Assignee::from_user(user));
        }
        self.lock = Some(ApplicationLock::held_by(user, clock.utc()));
        self.status = after;
        self.touch(clock);
        self.audit_entry(user, recorded, before, comment, clock)
    }

    fn ensure_stage_owner(&self, user: &User) -> Result<(), WorkflowDomainError> {
        if registry::role_for(self.status) == Some(user.role()) {
            Ok(())
        } else {
            Err(WorkflowDomainError::Unauthorized {
                role: user.role(),
                status: self.status,
            })
        }
    }

    fn ensure_lock_holder(&self, user: &User) -> Result<(), WorkflowDomainError> {
        if self.lock_holder() == Some(user.id()) {
            Ok(())
        } else {
            Err(WorkflowDomainError::NotLockHolder { user: user.id() })
        }
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.version = self.version.saturating_add(1);
        self.updated_at = clock.utc();
    }

    fn audit_entry(
        &self,
        user: &User,
        action: AuditAction,
        status_before: ApplicationStatus,
        comment: Option<String>,
        clock: &impl Clock,
    ) -> AuditLogEntry {
        AuditLogEntry::new(
            AuditEntryParams {
                application_id: self.id,
                actor: Actor::from(user),
                action,
                status_before,
                status_after: self.status,
                comment,
            },
            clock,
        )
    }
}

fn normalize_comment(comment: Option<String>) -> Option<String> {
    comment
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

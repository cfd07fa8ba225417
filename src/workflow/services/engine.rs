//! Orchestration of intake, claiming, and workflow transitions.
//!
//! Every mutating operation follows the same shape: load the application
//! and the acting user, let the aggregate validate and mutate a copy, then
//! persist the new state together with its audit entry through a single
//! conditional write keyed on the state that was read.

use crate::workflow::{
    domain::{
        ApplicationId, AuditLogEntry, ConcurrencyStamp, CustomerId, LoanApplication, LoanTerms,
        User, UserId, WorkflowAction,
    },
    ports::{ApplicationChange, ApplicationRepository, UserDirectory, WorkflowRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{WorkflowError, WorkflowResult};

/// Request payload for registering a new loan application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitApplicationRequest {
    creator: UserId,
    customer_id: CustomerId,
    amount: u64,
    purpose: String,
    term_months: u16,
    rate_bps: u32,
}

impl SubmitApplicationRequest {
    /// Creates a request with the requested amount and purpose.
    ///
    /// The term defaults to 12 months at a zero rate.
    #[must_use]
    pub fn new(
        creator: UserId,
        customer_id: CustomerId,
        amount: u64,
        purpose: impl Into<String>,
    ) -> Self {
        Self {
            creator,
            customer_id,
            amount,
            purpose: purpose.into(),
            term_months: 12,
            rate_bps: 0,
        }
    }

    /// Sets the loan term in months.
    #[must_use]
    pub const fn with_term_months(mut self, term_months: u16) -> Self {
        self.term_months = term_months;
        self
    }

    /// Sets the annual rate in basis points.
    #[must_use]
    pub const fn with_rate_bps(mut self, rate_bps: u32) -> Self {
        self.rate_bps = rate_bps;
        self
    }
}

/// Request payload for applying a workflow action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyActionRequest {
    application_id: ApplicationId,
    user_id: UserId,
    action: WorkflowAction,
    comment: Option<String>,
    expected_version: Option<u64>,
}

impl ApplyActionRequest {
    /// Creates a request without comment or version guard.
    #[must_use]
    pub const fn new(application_id: ApplicationId, user_id: UserId, action: WorkflowAction) -> Self {
        Self {
            application_id,
            user_id,
            action,
            comment: None,
            expected_version: None,
        }
    }

    /// Attaches a free-text comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Rejects the action unless the stored row is still at `version`.
    ///
    /// Callers pass the version they rendered so that acting on a stale view
    /// fails instead of silently applying to newer state.
    #[must_use]
    pub const fn with_expected_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Workflow orchestration service.
#[derive(Clone)]
pub struct WorkflowService<R, D, C>
where
    R: ApplicationRepository,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<R, D, C> WorkflowService<R, D, C>
where
    R: ApplicationRepository,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new workflow service.
    #[must_use]
    pub const fn new(repository: Arc<R>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            repository,
            directory,
            clock,
        }
    }

    /// Registers a new application in `diajukan`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::UserNotFound`] for an unknown creator,
    /// [`WorkflowError::Domain`] when the creator is not data-entry staff or
    /// the terms are invalid, and [`WorkflowError::Repository`] when
    /// persistence fails.
    pub async fn submit_application(
        &self,
        request: SubmitApplicationRequest,
    ) -> WorkflowResult<LoanApplication> {
        let creator = self.load_user(request.creator).await?;
        let terms = LoanTerms::new(
            request.amount,
            request.purpose,
            request.term_months,
            request.rate_bps,
        )?;
        let (application, entry) =
            LoanApplication::submit(request.customer_id, terms, &creator, &*self.clock)
                .inspect_err(|err| warn!(user = %creator.id(), error = %err, "submission rejected"))?;
        self.repository.insert(&application, &entry).await?;
        info!(
            application = %application.id(),
            user = %creator.id(),
            "application submitted"
        );
        Ok(application)
    }

    /// Claims an application for `user_id`.
    ///
    /// Taking an application already held by the same user is a no-op that
    /// writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Domain`] for terminal statuses, role
    /// mismatches, or a claim held by someone else, and
    /// [`WorkflowError::Repository`] when the application is unknown or a
    /// concurrent writer won the race.
    pub async fn take(
        &self,
        application_id: ApplicationId,
        user_id: UserId,
    ) -> WorkflowResult<LoanApplication> {
        let (mut application, user) = self.load(application_id, user_id).await?;
        let expected = application.stamp();
        let outcome = application
            .take(&user, &*self.clock)
            .inspect_err(|err| log_rejection("take", application_id, user_id, err))?;
        match outcome {
            Some(entry) => self.commit(application, expected, entry).await,
            None => {
                debug!(application = %application_id, user = %user_id, "already held by caller");
                Ok(application)
            }
        }
    }

    /// Releases a claim held by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Domain`] when the caller does not hold the
    /// claim and [`WorkflowError::Repository`] when the application is
    /// unknown or a concurrent writer won the race.
    pub async fn release(
        &self,
        application_id: ApplicationId,
        user_id: UserId,
    ) -> WorkflowResult<LoanApplication> {
        let (mut application, user) = self.load(application_id, user_id).await?;
        let expected = application.stamp();
        let entry = application
            .release(&user, &*self.clock)
            .inspect_err(|err| log_rejection("release", application_id, user_id, err))?;
        self.commit(application, expected, entry).await
    }

    /// Clears any claim on behalf of an administrator.
    ///
    /// Clearing an unclaimed application is a no-op that writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Domain`] when the caller is not an
    /// administrator and [`WorkflowError::Repository`] when the application
    /// is unknown or a concurrent writer won the race.
    pub async fn force_release(
        &self,
        application_id: ApplicationId,
        admin_id: UserId,
        comment: Option<String>,
    ) -> WorkflowResult<LoanApplication> {
        let (mut application, admin) = self.load(application_id, admin_id).await?;
        let expected = application.stamp();
        let outcome = application
            .force_release(&admin, comment, &*self.clock)
            .inspect_err(|err| log_rejection("force_release", application_id, admin_id, err))?;
        match outcome {
            Some(entry) => self.commit(application, expected, entry).await,
            None => Ok(application),
        }
    }

    /// Applies a workflow action on behalf of the claim holder.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Domain`] when the action is illegal, the
    /// caller does not hold the claim or own the stage, or a mandatory
    /// comment is missing. Returns [`WorkflowError::Repository`] when the
    /// application is unknown, the expected version is stale, or a
    /// concurrent writer won the race.
    pub async fn apply(&self, request: ApplyActionRequest) -> WorkflowResult<LoanApplication> {
        let ApplyActionRequest {
            application_id,
            user_id,
            action,
            comment,
            expected_version,
        } = request;
        let (mut application, user) = self.load(application_id, user_id).await?;
        if expected_version.is_some_and(|version| version != application.version()) {
            warn!(
                application = %application_id,
                user = %user_id,
                action = %action,
                "stale version supplied"
            );
            return Err(WorkflowRepositoryError::ConcurrentModification(application_id).into());
        }
        let expected = application.stamp();
        let entry = application
            .apply(&user, action, comment, &*self.clock)
            .inspect_err(|err| log_rejection(action.as_str(), application_id, user_id, err))?;
        self.commit(application, expected, entry).await
    }

    async fn load(
        &self,
        application_id: ApplicationId,
        user_id: UserId,
    ) -> WorkflowResult<(LoanApplication, User)> {
        let application = self
            .repository
            .find_by_id(application_id)
            .await?
            .ok_or(WorkflowRepositoryError::NotFound(application_id))?;
        let user = self.load_user(user_id).await?;
        Ok((application, user))
    }

    async fn load_user(&self, user_id: UserId) -> WorkflowResult<User> {
        self.directory
            .find_user(user_id)
            .await?
            .ok_or(WorkflowError::UserNotFound(user_id))
    }

    async fn commit(
        &self,
        application: LoanApplication,
        expected: ConcurrencyStamp,
        entry: AuditLogEntry,
    ) -> WorkflowResult<LoanApplication> {
        let change = ApplicationChange {
            application,
            expected,
            entry,
        };
        self.repository.commit(&change).await.inspect_err(|err| {
            if matches!(err, WorkflowRepositoryError::ConcurrentModification(_)) {
                warn!(application = %change.application.id(), "lost race to concurrent writer");
            }
        })?;
        info!(
            application = %change.application.id(),
            user = %change.entry.actor().user_id,
            action = %change.entry.action(),
            from = %change.entry.status_before(),
            to = %change.entry.status_after(),
            "workflow change recorded"
        );
        Ok(change.application)
    }
}

fn log_rejection(
    operation: &str,
    application_id: ApplicationId,
    user_id: UserId,
    err: &impl std::fmt::Display,
) {
    warn!(
        application = %application_id,
        user = %user_id,
        operation,
        error = %err,
        "operation rejected"
    );
}

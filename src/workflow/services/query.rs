//! Read-only projections over applications and their audit trails.

use crate::workflow::{
    domain::{
        ApplicationId, ApplicationStatus, AuditLogEntry, LoanApplication, ReplayedState, Role,
        UserId, registry, replay,
    },
    ports::{ApplicationRepository, AuditLog, WorkflowRepositoryError},
};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{WorkflowError, WorkflowResult};

/// Returns the statuses in which `role` may take an application.
#[must_use]
pub fn statuses_owned_by(role: Role) -> Vec<ApplicationStatus> {
    ApplicationStatus::ALL
        .into_iter()
        .filter(|status| registry::role_for(*status) == Some(role))
        .collect()
}

/// Returns whether `application` sits unclaimed in a status `role` owns.
#[must_use]
pub fn is_available_to(application: &LoanApplication, role: Role) -> bool {
    application.lock().is_none() && application.active_role() == Some(role)
}

/// Counts applications per status, reporting zero for unused statuses.
#[must_use]
pub fn count_by_status<'a>(
    applications: impl IntoIterator<Item = &'a LoanApplication>,
) -> BTreeMap<ApplicationStatus, usize> {
    let mut counts: BTreeMap<ApplicationStatus, usize> = ApplicationStatus::ALL
        .into_iter()
        .map(|status| (status, 0))
        .collect();
    for application in applications {
        *counts.entry(application.status()).or_default() += 1;
    }
    counts
}

/// Query service backing dashboards and work queues.
#[derive(Clone)]
pub struct WorkflowQueryService<R>
where
    R: ApplicationRepository + AuditLog,
{
    repository: Arc<R>,
}

impl<R> WorkflowQueryService<R>
where
    R: ApplicationRepository + AuditLog,
{
    /// Creates a new query service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Loads a single application.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when the application is unknown
    /// or the lookup fails.
    pub async fn get(&self, application_id: ApplicationId) -> WorkflowResult<LoanApplication> {
        self.repository
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| WorkflowRepositoryError::NotFound(application_id).into())
    }

    /// Lists unclaimed applications waiting for `role`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when the lookup fails.
    pub async fn available_to_take(&self, role: Role) -> WorkflowResult<Vec<LoanApplication>> {
        let statuses = statuses_owned_by(role);
        if statuses.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.repository.find_unclaimed(&statuses).await?)
    }

    /// Lists applications currently claimed by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when the lookup fails.
    pub async fn my_tasks(&self, user_id: UserId) -> WorkflowResult<Vec<LoanApplication>> {
        Ok(self.repository.find_claimed_by(user_id).await?)
    }

    /// Counts applications in every status.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when the lookup fails.
    pub async fn status_counts(&self) -> WorkflowResult<BTreeMap<ApplicationStatus, usize>> {
        let applications = self.repository.list_all().await?;
        Ok(count_by_status(&applications))
    }

    /// Returns the audit trail of an application, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when the application is unknown
    /// or the lookup fails.
    pub async fn history(&self, application_id: ApplicationId) -> WorkflowResult<Vec<AuditLogEntry>> {
        self.get(application_id).await?;
        Ok(self.repository.history_for(application_id).await?)
    }

    /// Rebuilds status, assignments, and claim from the audit trail alone.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Repository`] when the application is unknown
    /// and [`WorkflowError::Replay`] when the stored trail is inconsistent.
    pub async fn reconstruct(&self, application_id: ApplicationId) -> WorkflowResult<ReplayedState> {
        let entries = self.history(application_id).await?;
        replay(&entries).map_err(|source| WorkflowError::Replay {
            application_id,
            source,
        })
    }
}

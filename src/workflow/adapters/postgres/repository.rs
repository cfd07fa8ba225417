//! `PostgreSQL` repository implementation for workflow storage.

use super::{
    models::{
        ApplicationRow, ApplicationUpdate, AuditEntryRow, NewApplicationRow, NewAuditEntryRow,
        UserRow,
    },
    schema::{audit_log_entries, loan_applications, workflow_users},
};
use crate::workflow::{
    domain::{
        Actor, ApplicationId, ApplicationLock, ApplicationStatus, AuditAction, AuditEntryId,
        AuditEntryParams, AuditLogEntry, CustomerId, LoanApplication, LoanTerms,
        PersistedApplicationData, Role, RoleAssignments, User, UserId,
    },
    ports::{
        ApplicationChange, ApplicationRepository, AuditLog, UserDirectory,
        WorkflowRepositoryError, WorkflowRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by workflow adapters.
pub type WorkflowPgPool = Pool<ConnectionManager<PgConnection>>;

impl From<DieselError> for WorkflowRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed application store, audit trail, and user directory.
#[derive(Debug, Clone)]
pub struct PostgresWorkflowStore {
    pool: WorkflowPgPool,
}

impl PostgresWorkflowStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: WorkflowPgPool) -> Self {
        Self { pool }
    }

    /// Adds or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowRepositoryError::Persistence`] when the write fails.
    pub async fn upsert_user(&self, user: &User) -> WorkflowRepositoryResult<()> {
        let row = UserRow {
            id: user.id().into_inner(),
            name: user.name().to_owned(),
            role: user.role().as_str().to_owned(),
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(workflow_users::table)
                .values(&row)
                .on_conflict(workflow_users::id)
                .do_update()
                .set((
                    workflow_users::name.eq(&row.name),
                    workflow_users::role.eq(&row.role),
                ))
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> WorkflowRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> WorkflowRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(WorkflowRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(WorkflowRepositoryError::persistence)?
    }

    async fn load_applications<F>(&self, query: F) -> WorkflowRepositoryResult<Vec<LoanApplication>>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<Vec<ApplicationRow>> + Send + 'static,
    {
        self.run_blocking(move |connection| {
            query(connection)?
                .into_iter()
                .map(row_to_application)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl ApplicationRepository for PostgresWorkflowStore {
    async fn insert(
        &self,
        application: &LoanApplication,
        entry: &AuditLogEntry,
    ) -> WorkflowRepositoryResult<()> {
        let application_id = application.id();
        let new_row = to_new_row(application)?;
        let new_entry = to_new_entry(entry);

        self.run_blocking(move |connection| {
            connection.transaction::<_, WorkflowRepositoryError, _>(|tx| {
                diesel::insert_into(loan_applications::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            WorkflowRepositoryError::DuplicateApplication(application_id)
                        }
                        other => WorkflowRepositoryError::persistence(other),
                    })?;
                diesel::insert_into(audit_log_entries::table)
                    .values(&new_entry)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn commit(&self, change: &ApplicationChange) -> WorkflowRepositoryResult<()> {
        let id = change.application.id();
        let update = to_update(&change.application)?;
        let new_entry = to_new_entry(&change.entry);
        let expected_status = change.expected.status.as_str().to_owned();
        let expected_holder = change.expected.lock_holder.map(UserId::into_inner);
        let expected_version = to_version(change.expected.version)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, WorkflowRepositoryError, _>(|tx| {
                let updated = diesel::update(
                    loan_applications::table
                        .filter(loan_applications::id.eq(id.into_inner()))
                        .filter(loan_applications::status.eq(&expected_status))
                        .filter(loan_applications::lock_holder.is_not_distinct_from(expected_holder))
                        .filter(loan_applications::version.eq(expected_version)),
                )
                .set(&update)
                .execute(tx)?;

                if updated == 0 {
                    let exists: i64 = loan_applications::table
                        .filter(loan_applications::id.eq(id.into_inner()))
                        .count()
                        .get_result(tx)?;
                    return Err(if exists == 0 {
                        WorkflowRepositoryError::NotFound(id)
                    } else {
                        WorkflowRepositoryError::ConcurrentModification(id)
                    });
                }

                diesel::insert_into(audit_log_entries::table)
                    .values(&new_entry)
                    .execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> WorkflowRepositoryResult<Option<LoanApplication>> {
        self.run_blocking(move |connection| {
            let row = loan_applications::table
                .filter(loan_applications::id.eq(id.into_inner()))
                .select(ApplicationRow::as_select())
                .first::<ApplicationRow>(connection)
                .optional()?;
            row.map(row_to_application).transpose()
        })
        .await
    }

    async fn find_unclaimed(
        &self,
        statuses: &[ApplicationStatus],
    ) -> WorkflowRepositoryResult<Vec<LoanApplication>> {
        let wanted: Vec<String> = statuses
            .iter()
            .map(|status| status.as_str().to_owned())
            .collect();
        self.load_applications(move |connection| {
            loan_applications::table
                .filter(loan_applications::lock_holder.is_null())
                .filter(loan_applications::status.eq_any(wanted))
                .order((loan_applications::created_at, loan_applications::id))
                .select(ApplicationRow::as_select())
                .load(connection)
        })
        .await
    }

    async fn find_claimed_by(&self, user: UserId) -> WorkflowRepositoryResult<Vec<LoanApplication>> {
        self.load_applications(move |connection| {
            loan_applications::table
                .filter(loan_applications::lock_holder.eq(user.into_inner()))
                .order((loan_applications::created_at, loan_applications::id))
                .select(ApplicationRow::as_select())
                .load(connection)
        })
        .await
    }

    async fn list_all(&self) -> WorkflowRepositoryResult<Vec<LoanApplication>> {
        self.load_applications(|connection| {
            loan_applications::table
                .order((loan_applications::created_at, loan_applications::id))
                .select(ApplicationRow::as_select())
                .load(connection)
        })
        .await
    }
}

#[async_trait]
impl AuditLog for PostgresWorkflowStore {
    async fn history_for(
        &self,
        application_id: ApplicationId,
    ) -> WorkflowRepositoryResult<Vec<AuditLogEntry>> {
        self.run_blocking(move |connection| {
            audit_log_entries::table
                .filter(audit_log_entries::application_id.eq(application_id.into_inner()))
                .order(audit_log_entries::seq)
                .select(AuditEntryRow::as_select())
                .load::<AuditEntryRow>(connection)?
                .into_iter()
                .map(row_to_entry)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl UserDirectory for PostgresWorkflowStore {
    async fn find_user(&self, id: UserId) -> WorkflowRepositoryResult<Option<User>> {
        self.run_blocking(move |connection| {
            let row = workflow_users::table
                .filter(workflow_users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()?;
            row.map(|found| {
                let role =
                    Role::try_from(found.role.as_str()).map_err(WorkflowRepositoryError::persistence)?;
                Ok(User::with_id(UserId::from_uuid(found.id), found.name, role))
            })
            .transpose()
        })
        .await
    }
}

fn to_version(version: u64) -> WorkflowRepositoryResult<i64> {
    i64::try_from(version).map_err(WorkflowRepositoryError::persistence)
}

fn lock_columns(
    application: &LoanApplication,
) -> (Option<uuid::Uuid>, Option<String>, Option<chrono::DateTime<chrono::Utc>>) {
    application.lock().map_or((None, None, None), |lock| {
        (
            Some(lock.holder.into_inner()),
            Some(lock.holder_name.clone()),
            Some(lock.acquired_at),
        )
    })
}

fn to_new_row(application: &LoanApplication) -> WorkflowRepositoryResult<NewApplicationRow> {
    let terms = application.terms();
    let (lock_holder, lock_holder_name, locked_at) = lock_columns(application);
    Ok(NewApplicationRow {
        id: application.id().into_inner(),
        customer_id: application.customer_id().into_inner(),
        amount: i64::try_from(terms.amount()).map_err(WorkflowRepositoryError::persistence)?,
        purpose: terms.purpose().to_owned(),
        term_months: i32::from(terms.term_months()),
        rate_bps: i32::try_from(terms.rate_bps()).map_err(WorkflowRepositoryError::persistence)?,
        status: application.status().as_str().to_owned(),
        assignments: serde_json::to_value(application.assignments())
            .map_err(WorkflowRepositoryError::persistence)?,
        lock_holder,
        lock_holder_name,
        locked_at,
        version: to_version(application.version())?,
        created_at: application.created_at(),
        updated_at: application.updated_at(),
    })
}

fn to_update(application: &LoanApplication) -> WorkflowRepositoryResult<ApplicationUpdate> {
    let (lock_holder, lock_holder_name, locked_at) = lock_columns(application);
    Ok(ApplicationUpdate {
        status: application.status().as_str().to_owned(),
        assignments: serde_json::to_value(application.assignments())
            .map_err(WorkflowRepositoryError::persistence)?,
        lock_holder,
        lock_holder_name,
        locked_at,
        version: to_version(application.version())?,
        updated_at: application.updated_at(),
    })
}

fn to_new_entry(entry: &AuditLogEntry) -> NewAuditEntryRow {
    let actor = entry.actor();
    NewAuditEntryRow {
        id: entry.id().into_inner(),
        application_id: entry.application_id().into_inner(),
        actor_id: actor.user_id.into_inner(),
        actor_name: actor.name.clone(),
        actor_role: actor.role.as_str().to_owned(),
        action: entry.action().as_str().to_owned(),
        status_before: entry.status_before().as_str().to_owned(),
        status_after: entry.status_after().as_str().to_owned(),
        comment: entry.comment().map(str::to_owned),
        recorded_at: entry.recorded_at(),
    }
}

fn parse_status(value: &str) -> WorkflowRepositoryResult<ApplicationStatus> {
    ApplicationStatus::try_from(value).map_err(WorkflowRepositoryError::persistence)
}

fn row_to_application(row: ApplicationRow) -> WorkflowRepositoryResult<LoanApplication> {
    let ApplicationRow {
        id,
        customer_id,
        amount,
        purpose,
        term_months,
        rate_bps,
        status,
        assignments: persisted_assignments,
        lock_holder,
        lock_holder_name,
        locked_at,
        version,
        created_at,
        updated_at,
    } = row;

    let terms = LoanTerms::new(
        u64::try_from(amount).map_err(WorkflowRepositoryError::persistence)?,
        purpose,
        u16::try_from(term_months).map_err(WorkflowRepositoryError::persistence)?,
        u32::try_from(rate_bps).map_err(WorkflowRepositoryError::persistence)?,
    )
    .map_err(WorkflowRepositoryError::persistence)?;
    let assignments = serde_json::from_value::<RoleAssignments>(persisted_assignments)
        .map_err(WorkflowRepositoryError::persistence)?;
    let lock = match (lock_holder, lock_holder_name, locked_at) {
        (Some(holder), Some(holder_name), Some(acquired_at)) => Some(ApplicationLock {
            holder: UserId::from_uuid(holder),
            holder_name,
            acquired_at,
        }),
        _ => None,
    };

    Ok(LoanApplication::from_persisted(PersistedApplicationData {
        id: ApplicationId::from_uuid(id),
        customer_id: CustomerId::from_uuid(customer_id),
        terms,
        status: parse_status(&status)?,
        assignments,
        lock,
        version: u64::try_from(version).map_err(WorkflowRepositoryError::persistence)?,
        created_at,
        updated_at,
    }))
}

fn row_to_entry(row: AuditEntryRow) -> WorkflowRepositoryResult<AuditLogEntry> {
    let params = AuditEntryParams {
        application_id: ApplicationId::from_uuid(row.application_id),
        actor: Actor {
            user_id: UserId::from_uuid(row.actor_id),
            name: row.actor_name,
            role: Role::try_from(row.actor_role.as_str())
                .map_err(WorkflowRepositoryError::persistence)?,
        },
        action: AuditAction::try_from(row.action.as_str())
            .map_err(WorkflowRepositoryError::persistence)?,
        status_before: parse_status(&row.status_before)?,
        status_after: parse_status(&row.status_after)?,
        comment: row.comment,
    };
    Ok(AuditLogEntry::from_persisted(
        AuditEntryId::from_uuid(row.id),
        params,
        row.recorded_at,
    ))
}

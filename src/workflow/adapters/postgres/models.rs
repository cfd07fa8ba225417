//! Diesel row models for workflow persistence.

use super::schema::{audit_log_entries, loan_applications, workflow_users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for loan applications.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = loan_applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApplicationRow {
    pub id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub amount: i64,
    pub purpose: String,
    pub term_months: i32,
    pub rate_bps: i32,
    pub status: String,
    pub assignments: Value,
    pub lock_holder: Option<uuid::Uuid>,
    pub lock_holder_name: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert model for loan applications.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = loan_applications)]
pub struct NewApplicationRow {
    pub id: uuid::Uuid,
    pub customer_id: uuid::Uuid,
    pub amount: i64,
    pub purpose: String,
    pub term_months: i32,
    pub rate_bps: i32,
    pub status: String,
    pub assignments: Value,
    pub lock_holder: Option<uuid::Uuid>,
    pub lock_holder_name: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset written by conditional updates.
///
/// `treat_none_as_null` is required so releasing a claim clears the columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = loan_applications)]
#[diesel(treat_none_as_null = true)]
pub struct ApplicationUpdate {
    pub status: String,
    pub assignments: Value,
    pub lock_holder: Option<uuid::Uuid>,
    pub lock_holder_name: Option<String>,
    pub locked_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

/// Query result row for audit entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_log_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditEntryRow {
    pub id: uuid::Uuid,
    pub application_id: uuid::Uuid,
    pub actor_id: uuid::Uuid,
    pub actor_name: String,
    pub actor_role: String,
    pub action: String,
    pub status_before: String,
    pub status_after: String,
    pub comment: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for audit entries. `seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_log_entries)]
pub struct NewAuditEntryRow {
    pub id: uuid::Uuid,
    pub application_id: uuid::Uuid,
    pub actor_id: uuid::Uuid,
    pub actor_name: String,
    pub actor_role: String,
    pub action: String,
    pub status_before: String,
    pub status_after: String,
    pub comment: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Query result row for workflow users.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = workflow_users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub role: String,
}

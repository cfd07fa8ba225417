//! Diesel schema for workflow persistence.

diesel::table! {
    /// Loan applications with their claim and role-slot assignments.
    loan_applications (id) {
        /// Application identifier.
        id -> Uuid,
        /// Customer reference.
        customer_id -> Uuid,
        /// Requested amount in minor currency units.
        amount -> Int8,
        /// Stated purpose.
        purpose -> Text,
        /// Term in months.
        term_months -> Int4,
        /// Annual rate in basis points.
        rate_bps -> Int4,
        /// Workflow status.
        #[max_length = 32]
        status -> Varchar,
        /// Role-slot assignments.
        assignments -> Jsonb,
        /// Claim holder, if claimed.
        lock_holder -> Nullable<Uuid>,
        /// Claim holder display name.
        #[max_length = 255]
        lock_holder_name -> Nullable<Varchar>,
        /// Claim timestamp.
        locked_at -> Nullable<Timestamptz>,
        /// Row version bumped on every change.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit trail.
    audit_log_entries (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Insertion order.
        seq -> Int8,
        /// Application the entry belongs to.
        application_id -> Uuid,
        /// Acting user.
        actor_id -> Uuid,
        /// Acting user display name.
        #[max_length = 255]
        actor_name -> Varchar,
        /// Acting user role.
        #[max_length = 32]
        actor_role -> Varchar,
        /// Recorded action.
        #[max_length = 32]
        action -> Varchar,
        /// Status before the action.
        #[max_length = 32]
        status_before -> Varchar,
        /// Status after the action.
        #[max_length = 32]
        status_after -> Varchar,
        /// Optional free-text comment.
        comment -> Nullable<Text>,
        /// Recording timestamp.
        recorded_at -> Timestamptz,
    }
}

diesel::table! {
    /// Workflow users.
    workflow_users (id) {
        /// User identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Fixed role.
        #[max_length = 32]
        role -> Varchar,
    }
}

diesel::joinable!(audit_log_entries -> loan_applications (application_id));
diesel::allow_tables_to_appear_in_same_query!(audit_log_entries, loan_applications, workflow_users);

//! HTTP adapter exposing the workflow engine over JSON.
//!
//! Authentication is handled upstream; callers identify the acting user
//! with a `user_id` field in each mutating request body.

mod error;
mod extract;
mod handlers;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use mockable::Clock;

use crate::workflow::{
    ports::{ApplicationRepository, AuditLog, UserDirectory},
    services::{WorkflowQueryService, WorkflowService},
};

pub use error::ApiError;

/// Services shared by every route.
pub struct WorkflowApi<R, D, C>
where
    R: ApplicationRepository + AuditLog,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Mutating operations.
    pub workflow: WorkflowService<R, D, C>,
    /// Read-only projections.
    pub queries: WorkflowQueryService<R>,
}

impl<R, D, C> WorkflowApi<R, D, C>
where
    R: ApplicationRepository + AuditLog,
    D: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Wires both services over the same store.
    #[must_use]
    pub fn new(store: Arc<R>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            workflow: WorkflowService::new(Arc::clone(&store), directory, clock),
            queries: WorkflowQueryService::new(store),
        }
    }
}

/// Builds the router for every workflow endpoint plus `/health`.
pub fn workflow_router<R, D, C>(api: Arc<WorkflowApi<R, D, C>>) -> Router
where
    R: ApplicationRepository + AuditLog + 'static,
    D: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/rules", get(handlers::rules))
        .route("/api/v1/applications", post(handlers::submit::<R, D, C>))
        .route(
            "/api/v1/applications/:id",
            get(handlers::get_application::<R, D, C>),
        )
        .route(
            "/api/v1/applications/:id/take",
            post(handlers::take::<R, D, C>),
        )
        .route(
            "/api/v1/applications/:id/actions",
            post(handlers::apply::<R, D, C>),
        )
        .route(
            "/api/v1/applications/:id/release",
            post(handlers::release::<R, D, C>),
        )
        .route(
            "/api/v1/applications/:id/force-release",
            post(handlers::force_release::<R, D, C>),
        )
        .route(
            "/api/v1/applications/:id/history",
            get(handlers::history::<R, D, C>),
        )
        .route("/api/v1/queues/:role", get(handlers::queue::<R, D, C>))
        .route(
            "/api/v1/users/:id/tasks",
            get(handlers::my_tasks::<R, D, C>),
        )
        .route(
            "/api/v1/status-counts",
            get(handlers::status_counts::<R, D, C>),
        )
        .with_state(api)
}

//! HTTP error mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::workflow::services::{WorkflowError, WorkflowErrorKind};

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A workflow operation failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// The request could not be interpreted.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// Returns the `error` field reported to clients.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Workflow(err) => err.kind().as_str(),
            Self::BadRequest(_) => "bad_request",
        }
    }

    /// Returns the HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Workflow(err) => status_for(err.kind()),
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

const fn status_for(kind: WorkflowErrorKind) -> StatusCode {
    match kind {
        WorkflowErrorKind::NotFound => StatusCode::NOT_FOUND,
        WorkflowErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        WorkflowErrorKind::IllegalTransition
        | WorkflowErrorKind::AlreadyLocked
        | WorkflowErrorKind::NotLockHolder
        | WorkflowErrorKind::ConcurrentModification => StatusCode::CONFLICT,
        WorkflowErrorKind::CommentRequired | WorkflowErrorKind::InvalidTerms => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        WorkflowErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

//! Workflow actions an actor may request on an application.

use super::ParseActionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action requested through `apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    /// Send a submitted application into credit-administration review.
    Submit,
    /// Approve the current stage.
    Approve,
    /// Send the application back to an earlier stage.
    Return,
    /// Reject the application. Terminal.
    Reject,
    /// Re-enter a corrected application into the queue.
    Resubmit,
    /// Finish the credit analysis.
    Complete,
}

impl WorkflowAction {
    /// Every action.
    pub const ALL: [Self; 6] = [
        Self::Submit,
        Self::Approve,
        Self::Return,
        Self::Reject,
        Self::Resubmit,
        Self::Complete,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Return => "return",
            Self::Reject => "reject",
            Self::Resubmit => "resubmit",
            Self::Complete => "complete",
        }
    }

    /// Returns `true` when the action must carry a non-blank comment.
    #[must_use]
    pub const fn requires_comment(self) -> bool {
        matches!(self, Self::Reject | Self::Return)
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WorkflowAction {
    type Error = ParseActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == normalized)
            .ok_or_else(|| ParseActionError(value.to_owned()))
    }
}

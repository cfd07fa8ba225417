//! Application services orchestrating workflow domain operations.

mod engine;
mod error;
mod query;

pub use engine::{ApplyActionRequest, SubmitApplicationRequest, WorkflowService};
pub use error::{WorkflowError, WorkflowErrorKind, WorkflowResult};
pub use query::{WorkflowQueryService, count_by_status, is_available_to, statuses_owned_by};

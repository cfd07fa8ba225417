//! In-memory adapters used by tests and the default server configuration.

mod directory;
mod store;

pub use directory::InMemoryUserDirectory;
pub use store::InMemoryWorkflowStore;

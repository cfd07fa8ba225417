//! Shared world state for loan workflow BDD scenarios.

use std::collections::BTreeMap;
use std::sync::Arc;

use kreditflow::workflow::{
    adapters::memory::{InMemoryUserDirectory, InMemoryWorkflowStore},
    domain::{ApplicationId, LoanApplication, Role, User},
    services::{WorkflowError, WorkflowQueryService, WorkflowService},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestWorkflowService =
    WorkflowService<InMemoryWorkflowStore, InMemoryUserDirectory, DefaultClock>;

/// Scenario world for loan workflow behaviour tests.
pub struct LoanWorkflowWorld {
    pub service: TestWorkflowService,
    pub queries: WorkflowQueryService<InMemoryWorkflowStore>,
    pub staff: BTreeMap<Role, User>,
    pub colleague: User,
    pub application_id: Option<ApplicationId>,
    pub last_result: Option<Result<LoanApplication, WorkflowError>>,
}

impl LoanWorkflowWorld {
    /// Creates a world with one user per role and no application yet.
    #[must_use]
    pub fn new() -> Self {
        let staff: BTreeMap<Role, User> = [
            User::new("Sari", Role::StafInput),
            User::new("Agus", Role::AdminKredit),
            User::new("Rina", Role::Analis),
            User::new("Hendra", Role::Pemutus),
            User::new("Dewi", Role::Admin),
        ]
        .into_iter()
        .map(|user| (user.role(), user))
        .collect();
        let colleague = User::new("Yudi", Role::AdminKredit);

        let store = Arc::new(InMemoryWorkflowStore::new());
        let directory = Arc::new(InMemoryUserDirectory::with_users(
            staff.values().cloned().chain([colleague.clone()]),
        ));
        let service = WorkflowService::new(Arc::clone(&store), directory, Arc::new(DefaultClock));

        Self {
            service,
            queries: WorkflowQueryService::new(store),
            staff,
            colleague,
            application_id: None,
            last_result: None,
        }
    }

    /// Looks up the scenario user holding `role`.
    ///
    /// # Errors
    ///
    /// Returns an error when the role name is unknown.
    pub fn user(&self, role: &str) -> Result<User, eyre::Report> {
        let parsed = Role::try_from(role)
            .map_err(|err| eyre::eyre!("invalid role in scenario: {err}"))?;
        self.staff
            .get(&parsed)
            .cloned()
            .ok_or_else(|| eyre::eyre!("no scenario user for role {role}"))
    }

    /// Returns the application under test.
    ///
    /// # Errors
    ///
    /// Returns an error when no application has been submitted yet.
    pub fn application_id(&self) -> Result<ApplicationId, eyre::Report> {
        self.application_id
            .ok_or_else(|| eyre::eyre!("missing submitted application in scenario world"))
    }
}

impl Default for LoanWorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LoanWorkflowWorld {
    LoanWorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

//! Shared fixtures for workflow integration tests.

use std::sync::Arc;

use kreditflow::workflow::{
    adapters::memory::{InMemoryUserDirectory, InMemoryWorkflowStore},
    domain::{ApplicationId, CustomerId, Role, User, WorkflowAction},
    services::{
        ApplyActionRequest, SubmitApplicationRequest, WorkflowQueryService, WorkflowService,
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Service type wired over the in-memory store.
pub type MemoryService = WorkflowService<InMemoryWorkflowStore, InMemoryUserDirectory, DefaultClock>;

/// One user per role plus a second credit administrator.
pub struct Branch {
    pub staf_input: User,
    pub admin_kredit: User,
    pub second_admin_kredit: User,
    pub analis: User,
    pub pemutus: User,
    pub admin: User,
}

impl Branch {
    fn users(&self) -> Vec<User> {
        vec![
            self.staf_input.clone(),
            self.admin_kredit.clone(),
            self.second_admin_kredit.clone(),
            self.analis.clone(),
            self.pemutus.clone(),
            self.admin.clone(),
        ]
    }
}

/// Services and store shared by a single test.
pub struct Office {
    pub branch: Branch,
    pub store: Arc<InMemoryWorkflowStore>,
    pub service: Arc<MemoryService>,
    pub queries: WorkflowQueryService<InMemoryWorkflowStore>,
}

impl Office {
    /// Submits an application on behalf of the data-entry clerk.
    pub async fn submit(&self) -> eyre::Result<ApplicationId> {
        let request = SubmitApplicationRequest::new(
            self.branch.staf_input.id(),
            CustomerId::new(),
            75_000_000,
            "Pembelian mesin jahit",
        )
        .with_term_months(18)
        .with_rate_bps(1_050);
        Ok(self.service.submit_application(request).await?.id())
    }

    /// Claims the application as `user` and applies `action`.
    pub async fn take_and_apply(
        &self,
        id: ApplicationId,
        user: &User,
        action: WorkflowAction,
        comment: Option<&str>,
    ) -> eyre::Result<()> {
        self.service.take(id, user.id()).await?;
        let mut request = ApplyActionRequest::new(id, user.id(), action);
        if let Some(text) = comment {
            request = request.with_comment(text);
        }
        self.service.apply(request).await?;
        Ok(())
    }
}

/// Provides a branch office with fresh in-memory storage.
#[fixture]
pub fn office() -> Office {
    let branch = Branch {
        staf_input: User::new("Sari", Role::StafInput),
        admin_kredit: User::new("Agus", Role::AdminKredit),
        second_admin_kredit: User::new("Yudi", Role::AdminKredit),
        analis: User::new("Rina", Role::Analis),
        pemutus: User::new("Hendra", Role::Pemutus),
        admin: User::new("Dewi", Role::Admin),
    };
    let store = Arc::new(InMemoryWorkflowStore::new());
    let directory = Arc::new(InMemoryUserDirectory::with_users(branch.users()));
    let service = WorkflowService::new(Arc::clone(&store), directory, Arc::new(DefaultClock));
    Office {
        branch,
        queries: WorkflowQueryService::new(Arc::clone(&store)),
        service: Arc::new(service),
        store,
    }
}

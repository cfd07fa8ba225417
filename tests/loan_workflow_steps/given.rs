//! Given steps for loan workflow BDD scenarios.

use super::world::{LoanWorkflowWorld, run_async};
use kreditflow::workflow::{
    domain::{CustomerId, Role, WorkflowAction},
    services::{ApplyActionRequest, SubmitApplicationRequest},
};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given("a submitted loan application")]
fn submitted_application(world: &mut LoanWorkflowWorld) -> Result<(), eyre::Report> {
    let clerk = world.user(Role::StafInput.as_str())?;
    let request =
        SubmitApplicationRequest::new(clerk.id(), CustomerId::new(), 40_000_000, "Modal kerja")
            .with_term_months(24)
            .with_rate_bps(1_100);
    let created = run_async(world.service.submit_application(request))
        .wrap_err("submit application for scenario")?;
    world.application_id = Some(created.id());
    Ok(())
}

#[given("the credit admin has approved the application")]
fn credit_admin_approved(world: &mut LoanWorkflowWorld) -> Result<(), eyre::Report> {
    let id = world.application_id()?;
    let admin = world.user(Role::AdminKredit.as_str())?;
    run_async(world.service.take(id, admin.id())).wrap_err("credit admin claims application")?;
    run_async(
        world
            .service
            .apply(ApplyActionRequest::new(id, admin.id(), WorkflowAction::Approve)),
    )
    .wrap_err("credit admin approves application")?;
    Ok(())
}

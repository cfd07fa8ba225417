//! Then steps for loan workflow BDD scenarios.

use super::world::{LoanWorkflowWorld, run_async};
use kreditflow::workflow::{
    domain::{ApplicationStatus, LoanApplication, Role, RoleSlot, WorkflowAction},
    services::ApplyActionRequest,
};
use eyre::WrapErr;
use rstest_bdd_macros::then;

fn current(world: &LoanWorkflowWorld) -> Result<LoanApplication, eyre::Report> {
    let id = world.application_id()?;
    run_async(world.queries.get(id)).wrap_err("load application under test")
}

fn parse_status(status: &str) -> Result<ApplicationStatus, eyre::Report> {
    ApplicationStatus::try_from(status)
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))
}

#[then(r#"the application status is "{status}""#)]
fn status_is(world: &LoanWorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = parse_status(&status)?;
    let application = current(world)?;
    if application.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            application.status()
        ));
    }
    Ok(())
}

#[then("the application is not claimed")]
fn not_claimed(world: &LoanWorkflowWorld) -> Result<(), eyre::Report> {
    let application = current(world)?;
    if let Some(holder) = application.lock_holder() {
        return Err(eyre::eyre!("expected no claim, held by {holder}"));
    }
    Ok(())
}

#[then(r#"the application is claimed by the "{role}" user"#)]
fn claimed_by(world: &LoanWorkflowWorld, role: String) -> Result<(), eyre::Report> {
    let user = world.user(&role)?;
    let application = current(world)?;
    if application.lock_holder() != Some(user.id()) {
        return Err(eyre::eyre!(
            "expected claim by {}, found {:?}",
            user.name(),
            application.lock_holder()
        ));
    }
    Ok(())
}

#[then(r#"the "{role}" assignee is empty"#)]
fn assignee_is_empty(world: &LoanWorkflowWorld, role: String) -> Result<(), eyre::Report> {
    let slot: RoleSlot = Role::try_from(role.as_str())
        .map_err(|err| eyre::eyre!("invalid role in scenario: {err}"))?
        .slot()
        .ok_or_else(|| eyre::eyre!("role {role} owns no assignee slot"))?;
    let application = current(world)?;
    if let Some(assignee) = application.assignments().get(slot) {
        return Err(eyre::eyre!("expected empty {role} slot, found {}", assignee.name));
    }
    Ok(())
}

#[then(r#"the last operation fails with "{kind}""#)]
fn last_operation_fails(world: &LoanWorkflowWorld, kind: String) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing operation result"))?;
    match result {
        Err(err) if err.kind().as_str() == kind => Ok(()),
        Err(err) => Err(eyre::eyre!("expected {kind} failure, got {}: {err}", err.kind())),
        Ok(application) => Err(eyre::eyre!(
            "expected {kind} failure, operation succeeded at {}",
            application.status()
        )),
    }
}

#[then(r#"every further action by "{role}" is refused as "{kind}""#)]
fn every_action_refused(
    world: &LoanWorkflowWorld,
    role: String,
    kind: String,
) -> Result<(), eyre::Report> {
    let id = world.application_id()?;
    let user = world.user(&role)?;
    for action in WorkflowAction::ALL {
        let request =
            ApplyActionRequest::new(id, user.id(), action).with_comment("second thoughts");
        match run_async(world.service.apply(request)) {
            Err(err) if err.kind().as_str() == kind => {}
            Err(err) => return Err(eyre::eyre!("{action}: expected {kind}, got {err}")),
            Ok(_) => return Err(eyre::eyre!("{action}: expected {kind}, but it was applied")),
        }
    }
    Ok(())
}

#[then("the audit trail has {count:usize} entries")]
fn audit_trail_length(world: &LoanWorkflowWorld, count: usize) -> Result<(), eyre::Report> {
    let id = world.application_id()?;
    let history = run_async(world.queries.history(id)).wrap_err("load audit trail")?;
    if history.len() != count {
        return Err(eyre::eyre!(
            "expected {count} audit entries, found {}",
            history.len()
        ));
    }
    Ok(())
}

#[then(r#"the audit trail replays to "{status}""#)]
fn audit_trail_replays(world: &LoanWorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = parse_status(&status)?;
    let id = world.application_id()?;
    let replayed = run_async(world.queries.reconstruct(id)).wrap_err("replay audit trail")?;
    if replayed.status != expected {
        return Err(eyre::eyre!(
            "expected replay to reach {expected}, found {}",
            replayed.status
        ));
    }
    Ok(())
}

//! When steps for loan workflow BDD scenarios.

use super::world::{LoanWorkflowWorld, run_async};
use kreditflow::workflow::{
    domain::{LoanApplication, WorkflowAction},
    services::{ApplyActionRequest, WorkflowError},
};
use rstest_bdd_macros::when;

fn record(world: &mut LoanWorkflowWorld, result: Result<LoanApplication, WorkflowError>) {
    world.last_result = Some(result);
}

fn parse_action(action: &str) -> Result<WorkflowAction, eyre::Report> {
    WorkflowAction::try_from(action)
        .map_err(|err| eyre::eyre!("invalid action in scenario: {err}"))
}

#[when(r#"the "{role}" user takes the application"#)]
fn user_takes(world: &mut LoanWorkflowWorld, role: String) -> Result<(), eyre::Report> {
    let id = world.application_id()?;
    let user = world.user(&role)?;
    let result = run_async(world.service.take(id, user.id()));
    record(world, result);
    Ok(())
}

#[when(r#"a second "{role}" user takes the application"#)]
fn colleague_takes(world: &mut LoanWorkflowWorld, role: String) -> Result<(), eyre::Report> {
    let id = world.application_id()?;
    let colleague = world.colleague.clone();
    if colleague.role().as_str() != role {
        return Err(eyre::eyre!("no second scenario user for role {role}"));
    }
    let result = run_async(world.service.take(id, colleague.id()));
    record(world, result);
    Ok(())
}

#[when(r#"the "{role}" user applies "{action}" without comment"#)]
fn user_applies(
    world: &mut LoanWorkflowWorld,
    role: String,
    action: String,
) -> Result<(), eyre::Report> {
    let id = world.application_id()?;
    let user = world.user(&role)?;
    let request = ApplyActionRequest::new(id, user.id(), parse_action(&action)?);
    let result = run_async(world.service.apply(request));
    record(world, result);
    Ok(())
}

#[when(r#"the "{role}" user applies "{action}" with comment "{comment}""#)]
fn user_applies_with_comment(
    world: &mut LoanWorkflowWorld,
    role: String,
    action: String,
    comment: String,
) -> Result<(), eyre::Report> {
    let id = world.application_id()?;
    let user = world.user(&role)?;
    let request =
        ApplyActionRequest::new(id, user.id(), parse_action(&action)?).with_comment(comment);
    let result = run_async(world.service.apply(request));
    record(world, result);
    Ok(())
}

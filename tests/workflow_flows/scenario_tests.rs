//! Tests walking applications through whole review paths.

use super::helpers::{Office, office};
use kreditflow::workflow::{
    domain::{ApplicationStatus, AuditAction, RoleSlot, WorkflowAction},
    services::{ApplyActionRequest, WorkflowErrorKind},
};
use eyre::ensure;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn credit_admin_approval_hands_off_to_analysis(office: Office) -> eyre::Result<()> {
    let id = office.submit().await?;
    let before_take = office.queries.get(id).await?;
    ensure!(before_take.status() == ApplicationStatus::Diajukan);

    office
        .take_and_apply(id, &office.branch.admin_kredit, WorkflowAction::Approve, None)
        .await?;

    let application = office.queries.get(id).await?;
    ensure!(application.status() == ApplicationStatus::Dianalisis);
    ensure!(application.lock().is_none());
    ensure!(application.assignments().get(RoleSlot::Analis).is_none());
    ensure!(office.queries.my_tasks(office.branch.admin_kredit.id()).await?.is_empty());
    ensure!(
        office
            .queries
            .available_to_take(office.branch.analis.role())
            .await?
            .iter()
            .any(|queued| queued.id() == id)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn analyst_rejection_is_final(office: Office) -> eyre::Result<()> {
    let id = office.submit().await?;
    office
        .take_and_apply(id, &office.branch.admin_kredit, WorkflowAction::Approve, None)
        .await?;
    office
        .take_and_apply(
            id,
            &office.branch.analis,
            WorkflowAction::Reject,
            Some("incomplete docs"),
        )
        .await?;

    ensure!(office.queries.get(id).await?.status() == ApplicationStatus::Ditolak);
    for action in WorkflowAction::ALL {
        let attempt = office
            .service
            .apply(
                ApplyActionRequest::new(id, office.branch.analis.id(), action)
                    .with_comment("second thoughts"),
            )
            .await;
        ensure!(
            attempt.map_err(|err| err.kind()).err() == Some(WorkflowErrorKind::IllegalTransition),
            "{action} should be refused on a rejected application"
        );
    }
    let retake = office.service.take(id, office.branch.analis.id()).await;
    ensure!(retake.map_err(|err| err.kind()).err() == Some(WorkflowErrorKind::IllegalTransition));
    ensure!(office.queries.history(id).await?.len() == 5);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn returned_application_is_resubmitted_with_full_trail(office: Office) -> eyre::Result<()> {
    let id = office.submit().await?;
    office
        .take_and_apply(
            id,
            &office.branch.admin_kredit,
            WorkflowAction::Return,
            Some("missing ID"),
        )
        .await?;
    ensure!(office.queries.get(id).await?.status() == ApplicationStatus::Dikembalikan);

    office
        .take_and_apply(id, &office.branch.staf_input, WorkflowAction::Resubmit, None)
        .await?;

    let application = office.queries.get(id).await?;
    let history = office.queries.history(id).await?;
    let actions: Vec<AuditAction> = history.iter().map(|entry| entry.action()).collect();
    ensure!(application.status() == ApplicationStatus::Diajukan);
    ensure!(
        actions
            == vec![
                AuditAction::Created,
                AuditAction::Take,
                AuditAction::Workflow(WorkflowAction::Return),
                AuditAction::Take,
                AuditAction::Workflow(WorkflowAction::Resubmit),
            ]
    );
    ensure!(history.get(2).and_then(|entry| entry.comment()) == Some("missing ID"));
    ensure!(office.queries.reconstruct(id).await?.status == ApplicationStatus::Diajukan);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn analyst_return_goes_back_to_credit_review(office: Office) -> eyre::Result<()> {
    let id = office.submit().await?;
    office
        .take_and_apply(id, &office.branch.admin_kredit, WorkflowAction::Approve, None)
        .await?;
    office
        .take_and_apply(
            id,
            &office.branch.analis,
            WorkflowAction::Return,
            Some("slip gaji kurang"),
        )
        .await?;

    let application = office.queries.get(id).await?;
    ensure!(application.status() == ApplicationStatus::Diperiksa);
    ensure!(application.assignments().get(RoleSlot::Analis).is_none());
    ensure!(application.assignments().get(RoleSlot::AdminKredit).is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn decision_maker_cannot_send_back(office: Office) -> eyre::Result<()> {
    let id = office.submit().await?;
    office
        .take_and_apply(id, &office.branch.admin_kredit, WorkflowAction::Approve, None)
        .await?;
    office
        .take_and_apply(id, &office.branch.analis, WorkflowAction::Complete, None)
        .await?;
    office.service.take(id, office.branch.pemutus.id()).await?;

    let attempt = office
        .service
        .apply(
            ApplyActionRequest::new(id, office.branch.pemutus.id(), WorkflowAction::Return)
                .with_comment("perlu survei lokasi"),
        )
        .await;

    ensure!(attempt.map_err(|err| err.kind()).err() == Some(WorkflowErrorKind::IllegalTransition));
    let application = office.queries.get(id).await?;
    ensure!(application.status() == ApplicationStatus::SiapDiputuskan);
    ensure!(application.lock_holder() == Some(office.branch.pemutus.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn abandoned_claim_is_cleared_by_admin(office: Office) -> eyre::Result<()> {
    let id = office.submit().await?;
    office.service.take(id, office.branch.admin_kredit.id()).await?;

    let blocked = office.service.take(id, office.branch.second_admin_kredit.id()).await;
    ensure!(blocked.map_err(|err| err.kind()).err() == Some(WorkflowErrorKind::AlreadyLocked));

    office
        .service
        .force_release(id, office.branch.admin.id(), Some("cuti sakit".to_owned()))
        .await?;
    let claimed = office
        .service
        .take(id, office.branch.second_admin_kredit.id())
        .await?;

    ensure!(claimed.lock_holder() == Some(office.branch.second_admin_kredit.id()));
    Ok(())
}

//! Tests for racing writers on a single application.

use std::sync::Arc;

use super::helpers::{Office, office};
use kreditflow::workflow::{
    domain::{ApplicationStatus, WorkflowAction},
    ports::{ApplicationChange, ApplicationRepository, WorkflowRepositoryError},
    services::{ApplyActionRequest, WorkflowErrorKind},
};
use eyre::{ensure, eyre};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn competing_claims_admit_a_single_winner(office: Office) -> eyre::Result<()> {
    let id = office.submit().await?;
    let contenders = [
        office.branch.admin_kredit.id(),
        office.branch.second_admin_kredit.id(),
    ];

    let handles: Vec<_> = contenders
        .into_iter()
        .map(|user| {
            let service = Arc::clone(&office.service);
            tokio::spawn(async move { service.take(id, user).await })
        })
        .collect();
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await?);
    }

    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let losers: Vec<WorkflowErrorKind> = outcomes
        .into_iter()
        .filter_map(|outcome| outcome.err().map(|err| err.kind()))
        .collect();
    ensure!(winners == 1, "exactly one claim should win, got {winners}");
    ensure!(
        losers.iter().all(|kind| matches!(
            kind,
            WorkflowErrorKind::AlreadyLocked | WorkflowErrorKind::ConcurrentModification
        )),
        "unexpected loser outcome {losers:?}"
    );
    ensure!(office.queries.history(id).await?.len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn competing_submits_admit_a_single_winner(office: Office) -> eyre::Result<()> {
    let id = office.submit().await?;
    let contenders = [
        office.branch.admin_kredit.id(),
        office.branch.second_admin_kredit.id(),
    ];

    let handles = contenders.map(|user| {
        let service = Arc::clone(&office.service);
        tokio::spawn(async move {
            service
                .apply(ApplyActionRequest::new(id, user, WorkflowAction::Submit))
                .await
        })
    });
    let mut winners = Vec::new();
    for handle in handles {
        match handle.await? {
            Ok(application) => winners.extend(application.lock_holder()),
            Err(err) => ensure!(
                matches!(
                    err.kind(),
                    WorkflowErrorKind::NotLockHolder | WorkflowErrorKind::ConcurrentModification
                ),
                "unexpected loser outcome {err}"
            ),
        }
    }

    let stored = office.queries.get(id).await?;
    ensure!(winners.len() == 1, "exactly one submit should win, got {winners:?}");
    ensure!(stored.status() == ApplicationStatus::Diperiksa);
    ensure!(stored.lock_holder() == winners.first().copied());
    ensure!(office.queries.history(id).await?.len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn writes_computed_from_the_same_read_conflict(office: Office) -> eyre::Result<()> {
    let id = office.submit().await?;
    let clock = DefaultClock;
    let read = office
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| eyre!("submitted application should be stored"))?;

    let mut first = read.clone();
    let first_entry = first
        .take(&office.branch.admin_kredit, &clock)?
        .ok_or_else(|| eyre!("first take should record an entry"))?;
    let mut second = read.clone();
    let second_entry = second
        .take(&office.branch.second_admin_kredit, &clock)?
        .ok_or_else(|| eyre!("second take should record an entry"))?;

    office
        .store
        .commit(&ApplicationChange {
            application: first,
            expected: read.stamp(),
            entry: first_entry,
        })
        .await?;
    let stale = office
        .store
        .commit(&ApplicationChange {
            application: second,
            expected: read.stamp(),
            entry: second_entry,
        })
        .await;

    ensure!(matches!(
        stale,
        Err(WorkflowRepositoryError::ConcurrentModification(conflicted)) if conflicted == id
    ));
    let stored = office.queries.get(id).await?;
    ensure!(stored.lock_holder() == Some(office.branch.admin_kredit.id()));
    ensure!(office.queries.history(id).await?.len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn decisions_pinned_to_one_version_apply_once(office: Office) -> eyre::Result<()> {
    let id = office.submit().await?;
    let holder = office.branch.admin_kredit.id();
    let claimed = office.service.take(id, holder).await?;
    let version = claimed.version();

    let approve = ApplyActionRequest::new(id, holder, WorkflowAction::Approve)
        .with_expected_version(version);
    let reject = ApplyActionRequest::new(id, holder, WorkflowAction::Reject)
        .with_comment("agunan tidak cukup")
        .with_expected_version(version);
    let handles = [approve, reject].map(|request| {
        let service = Arc::clone(&office.service);
        tokio::spawn(async move { service.apply(request).await })
    });
    let mut applied = 0_usize;
    for handle in handles {
        match handle.await? {
            Ok(_) => applied += 1,
            Err(err) => {
                ensure!(
                    err.kind() == WorkflowErrorKind::ConcurrentModification,
                    "unexpected failure {err}"
                );
            }
        }
    }

    let status = office.queries.get(id).await?.status();
    ensure!(applied == 1);
    ensure!(matches!(
        status,
        ApplicationStatus::Dianalisis | ApplicationStatus::Ditolak
    ));
    ensure!(office.queries.history(id).await?.len() == 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn independent_applications_progress_in_parallel(office: Office) -> eyre::Result<()> {
    let first = office.submit().await?;
    let second = office.submit().await?;

    let handles = [
        (first, office.branch.admin_kredit.id()),
        (second, office.branch.second_admin_kredit.id()),
    ]
    .map(|(id, user)| {
        let service = Arc::clone(&office.service);
        tokio::spawn(async move { service.take(id, user).await })
    });
    for handle in handles {
        handle.await??;
    }

    ensure!(office.queries.get(first).await?.lock_holder() == Some(office.branch.admin_kredit.id()));
    ensure!(
        office.queries.get(second).await?.lock_holder()
            == Some(office.branch.second_admin_kredit.id())
    );
    Ok(())
}

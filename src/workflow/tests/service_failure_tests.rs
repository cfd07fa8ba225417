//! Failure-path tests for the workflow service using mocked ports.

use std::sync::Arc;

use super::support::{Staff, customer, staff, terms};
use crate::workflow::{
    domain::{ApplicationId, LoanApplication, User, WorkflowAction},
    ports::{MockApplicationRepository, MockUserDirectory, WorkflowRepositoryError},
    services::{ApplyActionRequest, WorkflowErrorKind, WorkflowService},
};
use mockable::DefaultClock;
use rstest::rstest;

type MockedService = WorkflowService<MockApplicationRepository, MockUserDirectory, DefaultClock>;

fn submitted(staff: &Staff) -> LoanApplication {
    LoanApplication::submit(customer(), terms(), &staff.staf_input, &DefaultClock)
        .map(|(application, _)| application)
        .expect("data entry may submit")
}

fn directory_with(user: User) -> MockUserDirectory {
    let mut directory = MockUserDirectory::new();
    let expected_id = user.id();
    directory
        .expect_find_user()
        .withf(move |id| *id == expected_id)
        .returning(move |_| Ok(Some(user.clone())));
    directory
}

fn repository_holding(application: &LoanApplication) -> MockApplicationRepository {
    let mut repository = MockApplicationRepository::new();
    let stored = application.clone();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(stored.clone())));
    repository
}

fn service(repository: MockApplicationRepository, directory: MockUserDirectory) -> MockedService {
    WorkflowService::new(Arc::new(repository), Arc::new(directory), Arc::new(DefaultClock))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn losing_the_write_race_surfaces_conflict(staff: Staff) {
    let application = submitted(&staff);
    let id = application.id();
    let mut repository = repository_holding(&application);
    repository
        .expect_commit()
        .times(1)
        .returning(move |_| Err(WorkflowRepositoryError::ConcurrentModification(id)));

    let result = service(repository, directory_with(staff.admin_kredit.clone()))
        .take(id, staff.admin_kredit.id())
        .await;

    assert_eq!(
        result.map_err(|err| err.kind()).err(),
        Some(WorkflowErrorKind::ConcurrentModification)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn commit_carries_the_stamp_that_was_read(staff: Staff) {
    let application = submitted(&staff);
    let id = application.id();
    let read_stamp = application.stamp();
    let mut repository = repository_holding(&application);
    repository
        .expect_commit()
        .withf(move |change| {
            change.expected == read_stamp
                && change.application.version() == read_stamp.version + 1
                && change.entry.application_id() == id
        })
        .times(1)
        .returning(|_| Ok(()));

    let result = service(repository, directory_with(staff.admin_kredit.clone()))
        .take(id, staff.admin_kredit.id())
        .await;

    assert!(result.is_ok());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rule_violations_never_reach_storage(staff: Staff) {
    let application = submitted(&staff);
    let mut repository = repository_holding(&application);
    repository.expect_commit().never();

    let result = service(repository, directory_with(staff.analis.clone()))
        .take(application.id(), staff.analis.id())
        .await;

    assert_eq!(
        result.map_err(|err| err.kind()).err(),
        Some(WorkflowErrorKind::Unauthorized)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn storage_failure_is_classified_as_storage(staff: Staff) {
    let mut repository = MockApplicationRepository::new();
    repository.expect_find_by_id().returning(|_| {
        Err(WorkflowRepositoryError::persistence(std::io::Error::other(
            "connection reset",
        )))
    });
    repository.expect_commit().never();

    let result = service(repository, MockUserDirectory::new())
        .apply(ApplyActionRequest::new(
            ApplicationId::new(),
            staff.analis.id(),
            WorkflowAction::Complete,
        ))
        .await;

    assert_eq!(
        result.map_err(|err| err.kind()).err(),
        Some(WorkflowErrorKind::Storage)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_actor_is_not_found(staff: Staff) {
    let application = submitted(&staff);
    let repository = repository_holding(&application);
    let mut directory = MockUserDirectory::new();
    directory.expect_find_user().returning(|_| Ok(None));

    let result = service(repository, directory)
        .release(application.id(), staff.admin_kredit.id())
        .await;

    assert_eq!(
        result.map_err(|err| err.kind()).err(),
        Some(WorkflowErrorKind::NotFound)
    );
}

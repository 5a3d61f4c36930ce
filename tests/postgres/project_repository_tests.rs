//! Project persistence tests against `PostgreSQL`.

use crate::postgres::helpers::{
    BoxError, PostgresCluster, insert_project, postgres_cluster, setup_repositories,
    test_runtime,
};
use mockable::DefaultClock;
use projectiq::project::{
    domain::{MemberId, OrganizationSlug, ProjectId, ProjectName, ProjectStatus},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use rstest::rstest;

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn stored_project_round_trips_with_members(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> Result<(), BoxError> {
    let repos = setup_repositories(postgres_cluster?, "project_round_trip")?;
    let rt = test_runtime()?;
    let first = MemberId::new();
    let second = MemberId::new();
    let project = insert_project(&rt, &repos, "Round trip")?
        .with_description("Stored with members");
    let mut with_members = project.with_members([second, first]);
    with_members.rename(ProjectName::new("Round trip v2")?, &DefaultClock);
    rt.block_on(repos.projects.update_details(&with_members))?;

    let stored = rt
        .block_on(repos.projects.find_by_id(with_members.id()))?
        .ok_or("project missing")?;

    assert_eq!(stored.name().as_str(), "Round trip v2");
    assert_eq!(stored.description(), Some("Stored with members"));
    assert_eq!(stored.members(), [second, first]);
    assert_eq!(stored.status(), ProjectStatus::Planning);
    repos.guard.cleanup()
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn duplicate_project_id_is_rejected(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> Result<(), BoxError> {
    let repos = setup_repositories(postgres_cluster?, "project_duplicate")?;
    let rt = test_runtime()?;
    let project = insert_project(&rt, &repos, "Original")?;

    let result = rt.block_on(repos.projects.store(&project));

    assert!(
        matches!(result, Err(ProjectRepositoryError::DuplicateProject(id)) if id == project.id()),
        "expected DuplicateProject, got {result:?}"
    );
    repos.guard.cleanup()
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn status_write_leaves_metadata_untouched(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> Result<(), BoxError> {
    let repos = setup_repositories(postgres_cluster?, "project_status")?;
    let rt = test_runtime()?;
    let project = insert_project(&rt, &repos, "Status only")?;

    rt.block_on(
        repos
            .projects
            .update_status(project.id(), ProjectStatus::InProgress),
    )?;
    let stored = rt
        .block_on(repos.projects.find_by_id(project.id()))?
        .ok_or("project missing")?;

    assert_eq!(stored.status(), ProjectStatus::InProgress);
    assert_eq!(stored.name(), project.name());
    assert_eq!(
        stored.updated_at().timestamp_micros(),
        project.updated_at().timestamp_micros()
    );
    repos.guard.cleanup()
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn status_write_for_unknown_project_is_not_found(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> Result<(), BoxError> {
    let repos = setup_repositories(postgres_cluster?, "project_missing")?;
    let rt = test_runtime()?;
    let ghost = ProjectId::new();

    let result = rt.block_on(repos.projects.update_status(ghost, ProjectStatus::Active));

    assert!(matches!(result, Err(ProjectRepositoryError::NotFound(id)) if id == ghost));
    repos.guard.cleanup()
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn organization_listing_is_oldest_first(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> Result<(), BoxError> {
    let repos = setup_repositories(postgres_cluster?, "project_listing")?;
    let rt = test_runtime()?;
    let older = insert_project(&rt, &repos, "Older")?;
    let newer = insert_project(&rt, &repos, "Newer")?;

    let listed = rt.block_on(
        repos
            .projects
            .find_by_organization(&OrganizationSlug::new("acme")?),
    )?;
    let other = rt.block_on(
        repos
            .projects
            .find_by_organization(&OrganizationSlug::new("globex")?),
    )?;

    let ids: Vec<ProjectId> = listed.iter().map(|project| project.id()).collect();
    assert_eq!(ids, [older.id(), newer.id()]);
    assert!(other.is_empty());
    repos.guard.cleanup()
}

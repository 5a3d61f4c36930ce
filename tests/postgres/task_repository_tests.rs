//! Task persistence tests against `PostgreSQL`.

use crate::postgres::helpers::{
    BoxError, PostgresCluster, insert_project, insert_task, postgres_cluster,
    setup_repositories, test_runtime,
};
use mockable::DefaultClock;
use projectiq::task::{
    domain::{TaskPosition, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
};
use rstest::rstest;

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn occupied_slot_is_reported_as_conflict(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> Result<(), BoxError> {
    let repos = setup_repositories(postgres_cluster?, "task_slot")?;
    let rt = test_runtime()?;
    let project = insert_project(&rt, &repos, "Slots")?;
    insert_task(&rt, &repos, &project, "Holder", TaskStatus::Todo, 0)?;

    let result = insert_task(&rt, &repos, &project, "Intruder", TaskStatus::Todo, 0);
    let err = result.err().ok_or("second insert should fail")?;
    let repository_err = err
        .downcast_ref::<TaskRepositoryError>()
        .ok_or("expected a task repository error")?;

    assert!(matches!(
        repository_err,
        TaskRepositoryError::PositionConflict { project_id, status: TaskStatus::Todo, position }
            if *project_id == project.id() && position.value() == 0
    ));
    repos.guard.cleanup()
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn same_position_in_other_column_is_allowed(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> Result<(), BoxError> {
    let repos = setup_repositories(postgres_cluster?, "task_columns")?;
    let rt = test_runtime()?;
    let project = insert_project(&rt, &repos, "Columns")?;
    insert_task(&rt, &repos, &project, "Queued", TaskStatus::Todo, 0)?;
    insert_task(&rt, &repos, &project, "Shipped", TaskStatus::Done, 0)?;

    let mut statuses = rt.block_on(repos.tasks.statuses_for_project(project.id()))?;
    statuses.sort();

    assert_eq!(statuses, [TaskStatus::Todo, TaskStatus::Done]);
    repos.guard.cleanup()
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn board_query_orders_by_column_then_position(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> Result<(), BoxError> {
    let repos = setup_repositories(postgres_cluster?, "task_board")?;
    let rt = test_runtime()?;
    let project = insert_project(&rt, &repos, "Ordering")?;
    insert_task(&rt, &repos, &project, "Done first", TaskStatus::Done, 0)?;
    insert_task(&rt, &repos, &project, "Todo second", TaskStatus::Todo, 1)?;
    insert_task(&rt, &repos, &project, "Todo first", TaskStatus::Todo, 0)?;

    let board = rt.block_on(repos.tasks.find_by_project(project.id()))?;
    let names: Vec<&str> = board.iter().map(|task| task.name().as_str()).collect();
    let last_todo = rt.block_on(repos.tasks.last_position(project.id(), TaskStatus::Todo))?;
    let last_review =
        rt.block_on(repos.tasks.last_position(project.id(), TaskStatus::InReview))?;

    assert_eq!(names, ["Todo first", "Todo second", "Done first"]);
    assert_eq!(last_todo, Some(TaskPosition::new(1)?));
    assert_eq!(last_review, None);
    repos.guard.cleanup()
}

#[rstest]
#[ignore = "requires embedded PostgreSQL"]
fn update_moves_task_and_remove_returns_last_state(
    postgres_cluster: Result<PostgresCluster, BoxError>,
) -> Result<(), BoxError> {
    let repos = setup_repositories(postgres_cluster?, "task_update")?;
    let rt = test_runtime()?;
    let project = insert_project(&rt, &repos, "Updates")?;
    let mut task = insert_task(&rt, &repos, &project, "Mover", TaskStatus::Todo, 0)?;

    task.move_to(TaskStatus::InReview, TaskPosition::new(3)?, &DefaultClock);
    task.describe(Some("Ready for eyes".to_owned()), &DefaultClock);
    rt.block_on(repos.tasks.update(&task))?;
    let removed = rt.block_on(repos.tasks.remove(task.id()))?;
    let gone = rt.block_on(repos.tasks.find_by_id(task.id()))?;
    let second_remove = rt.block_on(repos.tasks.remove(task.id()));

    assert_eq!(removed.status(), TaskStatus::InReview);
    assert_eq!(removed.position().value(), 3);
    assert_eq!(removed.description(), Some("Ready for eyes"));
    assert!(gone.is_none());
    assert!(matches!(second_remove, Err(TaskRepositoryError::NotFound(id)) if id == task.id()));
    repos.guard.cleanup()
}

//! Task board flows across several projects.

use super::helpers::{BoxError, Workspace, workspace};
use projectiq::project::domain::ProjectStatus;
use projectiq::task::{
    domain::{TaskPlacement, TaskPosition, TaskStatus},
    services::UpdateTaskRequest,
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_status_follows_task_lifecycle(workspace: Workspace) -> Result<(), BoxError> {
    let project = workspace.project("Lifecycle", &[]).await?;
    assert_eq!(workspace.stored(&project).await?.status(), ProjectStatus::Planning);

    let task = workspace.task(&project, "Sketch", TaskStatus::Backlog).await?;
    assert_eq!(workspace.stored(&project).await?.status(), ProjectStatus::Active);

    let change = workspace
        .board
        .update_task(task.id(), UpdateTaskRequest::new().with_status(TaskStatus::InReview))
        .await?;
    assert_eq!(change.project_status, Some(ProjectStatus::InProgress));

    let change = workspace
        .board
        .update_task(task.id(), UpdateTaskRequest::new().with_status(TaskStatus::Done))
        .await?;
    assert_eq!(change.project_status, Some(ProjectStatus::Completed));

    workspace.board.remove_task(task.id()).await?;
    assert_eq!(workspace.stored(&project).await?.status(), ProjectStatus::Planning);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn batch_spanning_projects_reconciles_each_once(
    workspace: Workspace,
) -> Result<(), BoxError> {
    let alpha = workspace.project("Alpha", &[]).await?;
    let beta = workspace.project("Beta", &[]).await?;
    let alpha_first = workspace.task(&alpha, "Alpha one", TaskStatus::Todo).await?;
    let alpha_second = workspace.task(&alpha, "Alpha two", TaskStatus::Todo).await?;
    let beta_only = workspace.task(&beta, "Beta one", TaskStatus::Todo).await?;

    let outcome = workspace
        .board
        .reposition_tasks([
            TaskPlacement::new(alpha_first.id(), TaskStatus::Done, TaskPosition::first()),
            TaskPlacement::new(beta_only.id(), TaskStatus::InProgress, TaskPosition::first()),
            TaskPlacement::new(alpha_second.id(), TaskStatus::Done, TaskPosition::new(1)?),
        ])
        .await?;

    assert_eq!(outcome.affected_projects, vec![alpha.id(), beta.id()]);
    assert!(outcome.stale_projects.is_empty());
    assert_eq!(workspace.stored(&alpha).await?.status(), ProjectStatus::Completed);
    assert_eq!(workspace.stored(&beta).await?.status(), ProjectStatus::InProgress);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rotating_a_full_column_reuses_its_slots(workspace: Workspace) -> Result<(), BoxError> {
    let project = workspace.project("Rotation", &[]).await?;
    let first = workspace.task(&project, "First", TaskStatus::Todo).await?;
    let second = workspace.task(&project, "Second", TaskStatus::Todo).await?;
    let third = workspace.task(&project, "Third", TaskStatus::Todo).await?;

    workspace
        .board
        .reposition_tasks([
            TaskPlacement::new(third.id(), TaskStatus::Todo, first.position()),
            TaskPlacement::new(first.id(), TaskStatus::Todo, second.position()),
            TaskPlacement::new(second.id(), TaskStatus::Todo, third.position()),
        ])
        .await?;

    let board = workspace.board.board(project.id()).await?;
    let order: Vec<&str> = board.iter().map(|task| task.name().as_str()).collect();
    assert_eq!(order, ["Third", "First", "Second"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_batch_leaves_every_project_untouched(
    workspace: Workspace,
) -> Result<(), BoxError> {
    let project = workspace.project("Guarded", &[]).await?;
    let kept = workspace.task(&project, "Kept", TaskStatus::Todo).await?;
    let occupant = workspace.task(&project, "Occupant", TaskStatus::Done).await?;

    // `occupant` keeps its DONE slot, so the final phase collides with it.
    let result = workspace
        .board
        .reposition_tasks([TaskPlacement::new(
            kept.id(),
            TaskStatus::Done,
            occupant.position(),
        )])
        .await;

    assert!(result.is_err());
    let board = workspace.board.board(project.id()).await?;
    assert_eq!(board.len(), 2);
    assert!(board.contains(&kept));
    assert!(board.contains(&occupant));
    assert_eq!(workspace.stored(&project).await?.status(), ProjectStatus::Active);
    Ok(())
}

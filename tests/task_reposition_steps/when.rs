//! When steps for task reposition BDD scenarios.

use super::world::{RepositionWorld, run_async};
use projectiq::task::domain::{TaskId, TaskPlacement, TaskPosition, TaskStatus};
use rstest_bdd_macros::when;

fn parse_column(status: &str) -> Result<TaskStatus, eyre::Report> {
    TaskStatus::try_from(status).map_err(|err| eyre::eyre!("invalid column in scenario: {err}"))
}

#[when(r#""{first}" and "{second}" are moved to "{status}" at positions {first_position:i64} and {second_position:i64}"#)]
fn move_pair(
    world: &mut RepositionWorld,
    first: String,
    second: String,
    status: String,
    first_position: i64,
    second_position: i64,
) -> Result<(), eyre::Report> {
    let column = parse_column(&status)?;
    let placements = [
        TaskPlacement::new(world.task_id(&first)?, column, TaskPosition::new(first_position)?),
        TaskPlacement::new(world.task_id(&second)?, column, TaskPosition::new(second_position)?),
    ];
    world.last_outcome = Some(run_async(world.board.reposition_tasks(placements)));
    Ok(())
}

#[when(r#""{name}" and an unknown task are moved to "{status}""#)]
fn move_with_unknown(
    world: &mut RepositionWorld,
    name: String,
    status: String,
) -> Result<(), eyre::Report> {
    let column = parse_column(&status)?;
    let unknown = TaskId::new();
    let placements = [
        TaskPlacement::new(world.task_id(&name)?, column, TaskPosition::first()),
        TaskPlacement::new(unknown, column, TaskPosition::new(1)?),
    ];
    world.unknown_task = Some(unknown);
    world.last_outcome = Some(run_async(world.board.reposition_tasks(placements)));
    Ok(())
}

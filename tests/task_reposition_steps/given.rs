//! Given steps for task reposition BDD scenarios.

use super::world::{RepositionWorld, run_async};
use eyre::WrapErr;
use mockable::DefaultClock;
use projectiq::project::{
    domain::{OrganizationSlug, Project, ProjectName},
    ports::ProjectRepository,
};
use projectiq::task::{domain::TaskStatus, services::CreateTaskRequest};
use rstest_bdd_macros::given;

#[given("a project on the board")]
fn project_on_board(world: &mut RepositionWorld) -> Result<(), eyre::Report> {
    let project = Project::new(
        OrganizationSlug::new("acme")?,
        ProjectName::new("Website relaunch")?,
        &DefaultClock,
    );
    run_async(world.projects.store(&project)).wrap_err("store scenario project")?;
    world.project_id = Some(project.id());
    Ok(())
}

#[given(r#"a task "{name}" in column "{status}""#)]
fn task_in_column(
    world: &mut RepositionWorld,
    name: String,
    status: String,
) -> Result<(), eyre::Report> {
    let project_id = world.project_id()?;
    let column = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid column in scenario: {err}"))?;
    let change = run_async(
        world
            .board
            .create_task(CreateTaskRequest::new(project_id, name.clone(), column)),
    )
    .wrap_err("create scenario task")?;
    world.task_ids.insert(name, change.task.id());
    Ok(())
}

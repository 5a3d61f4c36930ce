//! Shared world state for task reposition BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use projectiq::project::{
    adapters::memory::InMemoryProjectRepository, domain::ProjectId,
};
use projectiq::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::TaskId,
    services::{RepositionOutcome, TaskBoardResult, TaskBoardService},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestBoardService =
    TaskBoardService<InMemoryTaskRepository, InMemoryProjectRepository, DefaultClock>;

/// Scenario world for reposition behaviour tests.
pub struct RepositionWorld {
    pub projects: Arc<InMemoryProjectRepository>,
    pub tasks: Arc<InMemoryTaskRepository>,
    pub board: TestBoardService,
    pub project_id: Option<ProjectId>,
    pub task_ids: HashMap<String, TaskId>,
    pub unknown_task: Option<TaskId>,
    pub last_outcome: Option<TaskBoardResult<RepositionOutcome>>,
}

impl RepositionWorld {
    /// Creates a world with an empty board.
    #[must_use]
    pub fn new() -> Self {
        let projects = Arc::new(InMemoryProjectRepository::new());
        let tasks = Arc::new(InMemoryTaskRepository::new());
        let board = TaskBoardService::new(
            Arc::clone(&tasks),
            Arc::clone(&projects),
            Arc::new(DefaultClock),
        );

        Self {
            projects,
            tasks,
            board,
            project_id: None,
            task_ids: HashMap::new(),
            unknown_task: None,
            last_outcome: None,
        }
    }

    /// Returns the scenario project.
    pub fn project_id(&self) -> Result<ProjectId, eyre::Report> {
        self.project_id
            .ok_or_else(|| eyre::eyre!("missing project in scenario world"))
    }

    /// Resolves a task created earlier in the scenario by name.
    pub fn task_id(&self, name: &str) -> Result<TaskId, eyre::Report> {
        self.task_ids
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task named {name} in scenario world"))
    }
}

impl Default for RepositionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RepositionWorld {
    RepositionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

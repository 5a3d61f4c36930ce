//! Repository port for task persistence and transactional reordering.

use crate::project::domain::ProjectId;
use crate::task::domain::{
    RepositionBatch, RepositionedTask, Task, TaskId, TaskPosition, TaskStatus,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists or [`TaskRepositoryError::PositionConflict`] when another task
    /// already occupies the slot.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// or [`TaskRepositoryError::PositionConflict`] when the new slot is
    /// taken.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Deletes a task and returns its last persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn remove(&self, id: TaskId) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task of a project ordered by status, then position.
    async fn find_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns the status of every task in a project, one entry per task.
    async fn statuses_for_project(
        &self,
        project_id: ProjectId,
    ) -> TaskRepositoryResult<Vec<TaskStatus>>;

    /// Returns the highest position used in a `(project, status)` column.
    ///
    /// Returns `None` for an empty column.
    async fn last_position(
        &self,
        project_id: ProjectId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Option<TaskPosition>>;

    /// Applies a reposition batch atomically.
    ///
    /// Every referenced task is first checked for existence. Tasks are then
    /// parked at their quarantine keys with their target status, moved to
    /// their target positions, and read back. All of this happens in one
    /// transaction; `updated_at` is set to `timestamp` on every moved task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::MissingTasks`] without writing anything
    /// when any referenced task does not exist, and propagates any failure of
    /// the transaction itself, in which case no placement is applied.
    async fn reposition(
        &self,
        batch: &RepositionBatch,
        timestamp: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<RepositionedTask>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// One or more tasks referenced by a reposition batch do not exist.
    #[error("tasks not found: {}", join_ids(.0))]
    MissingTasks(Vec<TaskId>),

    /// Another task already occupies the requested slot.
    #[error("position {position} in column {status} of project {project_id} is already taken")]
    PositionConflict {
        /// Project owning the column.
        project_id: ProjectId,
        /// Column status.
        status: TaskStatus,
        /// Contested position.
        position: TaskPosition,
    },

    /// Persistence-layer failure, including aborted transactions.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns whether the error reports missing tasks.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::MissingTasks(_))
    }
}

impl From<diesel::result::Error> for TaskRepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

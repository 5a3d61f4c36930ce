//! Task board orchestration: task mutations followed by status
//! reconciliation of the owning projects.
//!
//! Every mutation commits first and reconciles afterwards. A reconciliation
//! failure never undoes or fails a committed write; it is logged and
//! reported back so the caller knows which project statuses may be stale.

use super::{CreateTaskRequest, UpdateTaskRequest};
use crate::project::{
    domain::{MemberId, Project, ProjectId, ProjectStatus},
    ports::{ProjectRepository, ProjectRepositoryError},
    services::{ProjectStatusReconciler, ReconciliationReport},
};
use crate::task::{
    domain::{
        NewTask, RepositionBatch, RepositionedTask, Task, TaskDomainError, TaskId, TaskName,
        TaskPlacement, TaskPosition, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for task board operations.
#[derive(Debug, Clone, Error)]
pub enum TaskBoardError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// Project repository operation failed.
    #[error(transparent)]
    Project(#[from] ProjectRepositoryError),
    /// The owning project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// The assignee is not a member of the owning project.
    #[error("member {assignee} does not belong to project {project_id}")]
    AssigneeNotMember {
        /// Rejected assignee.
        assignee: MemberId,
        /// Owning project.
        project_id: ProjectId,
    },
}

/// Result type for task board operations.
pub type TaskBoardResult<T> = Result<T, TaskBoardError>;

/// A committed single-task mutation.
#[derive(Debug, Clone)]
pub struct TaskChange {
    /// Task state after the write; for removals, its last state.
    pub task: Task,
    /// Derived project status, or `None` when reconciliation failed and the
    /// stored status may be stale.
    pub project_status: Option<ProjectStatus>,
}

/// A committed bulk reposition.
#[derive(Debug, Clone)]
pub struct RepositionOutcome {
    /// Tasks as read back inside the reposition transaction, in request
    /// order.
    pub tasks: Vec<RepositionedTask>,
    /// Distinct projects touched by the batch, in first-seen order.
    pub affected_projects: Vec<ProjectId>,
    /// Affected projects whose reconciliation failed.
    pub stale_projects: Vec<ProjectId>,
}

/// Task board orchestration service.
#[derive(Clone)]
pub struct TaskBoardService<T, P, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    projects: Arc<P>,
    reconciler: ProjectStatusReconciler<P, T>,
    clock: Arc<C>,
}

impl<T, P, C> TaskBoardService<T, P, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task board service.
    #[must_use]
    pub fn new(tasks: Arc<T>, projects: Arc<P>, clock: Arc<C>) -> Self {
        let reconciler = ProjectStatusReconciler::new(Arc::clone(&projects), Arc::clone(&tasks));
        Self {
            tasks,
            projects,
            reconciler,
            clock,
        }
    }

    /// Returns the reconciler used after every mutation.
    #[must_use]
    pub const fn reconciler(&self) -> &ProjectStatusReconciler<P, T> {
        &self.reconciler
    }

    /// Creates a task at the end of its column and reconciles the project.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::ProjectNotFound`] for an unknown project,
    /// [`TaskBoardError::AssigneeNotMember`] for an outside assignee, and
    /// domain or repository errors for invalid input or failed writes.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskBoardResult<TaskChange> {
        let name = TaskName::new(request.name)?;
        let project = self.require_project(request.project_id).await?;
        if let Some(assignee) = request.assignee {
            ensure_member(&project, assignee)?;
        }

        let last = self
            .tasks
            .last_position(request.project_id, request.status)
            .await?;
        let task = Task::new(
            NewTask {
                project_id: request.project_id,
                name,
                status: request.status,
                position: TaskPosition::end_of_column(last),
                description: request.description,
                assignee: request.assignee,
                due_date: request.due_date,
            },
            &*self.clock,
        );
        self.tasks.store(&task).await?;
        info!(task_id = %task.id(), project_id = %task.project_id(), status = %task.status(), "task created");

        Ok(self.settle(task).await)
    }

    /// Applies a task edit and reconciles the project.
    ///
    /// A status change without an explicit position moves the task to the
    /// end of the new column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] (wrapped) for an unknown
    /// task, [`TaskBoardError::AssigneeNotMember`] for an outside assignee,
    /// and repository errors for failed writes including slot conflicts.
    pub async fn update_task(
        &self,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskBoardResult<TaskChange> {
        let UpdateTaskRequest {
            name: new_name,
            description: new_description,
            assignee: new_assignee,
            due_date: new_due_date,
            status,
            position,
        } = request;
        let mut task = self.require_task(id).await?;

        if let Some(raw_name) = new_name {
            task.rename(TaskName::new(raw_name)?, &*self.clock);
        }
        if let Some(description) = new_description {
            task.describe(description, &*self.clock);
        }
        if let Some(assignee) = new_assignee {
            if let Some(member) = assignee {
                let project = self.require_project(task.project_id()).await?;
                ensure_member(&project, member)?;
            }
            task.assign(assignee, &*self.clock);
        }
        if let Some(due_date) = new_due_date {
            task.schedule(due_date, &*self.clock);
        }
        if status.is_some() || position.is_some() {
            self.relocate(&mut task, status, position).await?;
        }

        self.tasks.update(&task).await?;
        Ok(self.settle(task).await)
    }

    /// Deletes a task and reconciles its former project.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] (wrapped) for an unknown
    /// task.
    pub async fn remove_task(&self, id: TaskId) -> TaskBoardResult<TaskChange> {
        let removed = self.tasks.remove(id).await?;
        info!(task_id = %id, project_id = %removed.project_id(), "task removed");
        Ok(self.settle(removed).await)
    }

    /// Repositions a batch of tasks atomically, then reconciles every
    /// affected project once.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::Domain`] for an empty, oversized or
    /// duplicated batch, [`TaskRepositoryError::MissingTasks`] (wrapped)
    /// when any task does not exist, and any transaction failure. In every
    /// error case no task has moved.
    pub async fn reposition_tasks(
        &self,
        placements: impl IntoIterator<Item = TaskPlacement>,
    ) -> TaskBoardResult<RepositionOutcome> {
        let batch = RepositionBatch::new(placements)?;
        let moved = self.tasks.reposition(&batch, self.clock.utc()).await?;

        let mut seen = HashSet::new();
        let affected_projects: Vec<ProjectId> = moved
            .iter()
            .map(|task| task.project_id)
            .filter(|project_id| seen.insert(*project_id))
            .collect();
        info!(
            task_count = moved.len(),
            project_count = affected_projects.len(),
            "reposition committed"
        );

        let reports = self
            .reconciler
            .reconcile_many(affected_projects.iter().copied())
            .await;
        let stale_projects = reports
            .iter()
            .filter_map(stale_project)
            .collect();

        Ok(RepositionOutcome {
            tasks: moved,
            affected_projects,
            stale_projects,
        })
    }

    /// Lists the tasks of a project ordered by column, then position.
    ///
    /// # Errors
    ///
    /// Returns [`TaskBoardError::ProjectNotFound`] for an unknown project.
    pub async fn board(&self, project_id: ProjectId) -> TaskBoardResult<Vec<Task>> {
        self.require_project(project_id).await?;
        Ok(self.tasks.find_by_project(project_id).await?)
    }

    async fn relocate(
        &self,
        task: &mut Task,
        status: Option<TaskStatus>,
        position: Option<TaskPosition>,
    ) -> TaskBoardResult<()> {
        let target_status = status.unwrap_or_else(|| task.status());
        let target_position = match position {
            Some(explicit) => explicit,
            None if target_status == task.status() => return Ok(()),
            None => {
                let last = self
                    .tasks
                    .last_position(task.project_id(), target_status)
                    .await?;
                TaskPosition::end_of_column(last)
            }
        };
        task.move_to(target_status, target_position, &*self.clock);
        Ok(())
    }

    async fn settle(&self, task: Task) -> TaskChange {
        let project_id = task.project_id();
        let project_status = match self.reconciler.reconcile(project_id).await {
            Ok(status) => Some(status),
            Err(err) => {
                warn!(%project_id, error = %err, "project status left stale after task write");
                None
            }
        };
        TaskChange {
            task,
            project_status,
        }
    }

    async fn require_project(&self, project_id: ProjectId) -> TaskBoardResult<Project> {
        self.projects
            .find_by_id(project_id)
            .await?
            .ok_or(TaskBoardError::ProjectNotFound(project_id))
    }

    async fn require_task(&self, id: TaskId) -> TaskBoardResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(TaskBoardError::Repository(TaskRepositoryError::NotFound(id)))
    }
}

fn ensure_member(project: &Project, assignee: MemberId) -> TaskBoardResult<()> {
    if project.is_member(assignee) {
        Ok(())
    } else {
        Err(TaskBoardError::AssigneeNotMember {
            assignee,
            project_id: project.id(),
        })
    }
}

fn stale_project(report: &ReconciliationReport) -> Option<ProjectId> {
    let Err(err) = &report.outcome else {
        return None;
    };
    warn!(project_id = %report.project_id, error = %err, "project status left stale after reposition");
    Some(report.project_id)
}

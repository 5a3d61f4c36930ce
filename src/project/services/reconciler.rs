//! Derived project status reconciliation.
//!
//! The reconciler reads the statuses of a project's tasks, derives the
//! project status with [`derive_project_status`], and writes it back. It
//! performs no retries; callers decide whether a failure matters.

use crate::project::{
    domain::{ProjectId, ProjectStatus, derive_project_status},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use crate::task::ports::{TaskRepository, TaskRepositoryError};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors returned while reconciling a project status.
#[derive(Debug, Clone, Error)]
pub enum ReconcileError {
    /// The project disappeared before its status could be written.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// Reading the project's task statuses failed.
    #[error("failed to read task statuses: {0}")]
    Tasks(#[from] TaskRepositoryError),
    /// Writing the derived status failed.
    #[error("failed to persist project status: {0}")]
    Projects(ProjectRepositoryError),
}

impl From<ProjectRepositoryError> for ReconcileError {
    fn from(err: ProjectRepositoryError) -> Self {
        match err {
            ProjectRepositoryError::NotFound(id) => Self::ProjectNotFound(id),
            other => Self::Projects(other),
        }
    }
}

/// Outcome of reconciling one project inside a bulk reconciliation.
#[derive(Debug, Clone)]
pub struct ReconciliationReport {
    /// Project that was reconciled.
    pub project_id: ProjectId,
    /// Derived status, or the reason it could not be written.
    pub outcome: Result<ProjectStatus, ReconcileError>,
}

impl ReconciliationReport {
    /// Returns whether the derived status was persisted.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Recomputes and persists derived project statuses.
#[derive(Clone)]
pub struct ProjectStatusReconciler<P, T>
where
    P: ProjectRepository,
    T: TaskRepository,
{
    projects: Arc<P>,
    tasks: Arc<T>,
}

impl<P, T> ProjectStatusReconciler<P, T>
where
    P: ProjectRepository,
    T: TaskRepository,
{
    /// Creates a reconciler over the given repositories.
    #[must_use]
    pub const fn new(projects: Arc<P>, tasks: Arc<T>) -> Self {
        Self { projects, tasks }
    }

    /// Derives and persists the status of one project.
    ///
    /// Running it twice without an intervening task change writes the same
    /// value twice.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Tasks`] when the task read fails,
    /// [`ReconcileError::ProjectNotFound`] when the project no longer exists
    /// and [`ReconcileError::Projects`] for other write failures.
    pub async fn reconcile(&self, project_id: ProjectId) -> Result<ProjectStatus, ReconcileError> {
        let statuses = self.tasks.statuses_for_project(project_id).await?;
        let task_count = statuses.len();
        let status = derive_project_status(statuses);
        debug!(%project_id, task_count, %status, "derived project status");
        self.projects.update_status(project_id, status).await?;
        Ok(status)
    }

    /// Reconciles several projects concurrently.
    ///
    /// Duplicate identifiers are reconciled once; reports follow the order in
    /// which each identifier first appears. A failure for one project does
    /// not affect the others.
    pub async fn reconcile_many(
        &self,
        project_ids: impl IntoIterator<Item = ProjectId>,
    ) -> Vec<ReconciliationReport> {
        let mut seen = HashSet::new();
        let distinct: Vec<ProjectId> = project_ids
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        join_all(distinct.into_iter().map(|project_id| async move {
            ReconciliationReport {
                project_id,
                outcome: self.reconcile(project_id).await,
            }
        }))
        .await
    }
}

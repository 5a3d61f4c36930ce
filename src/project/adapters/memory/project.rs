//! In-memory repository for project tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::project::{
    domain::{OrganizationSlug, Project, ProjectId, ProjectStatus},
    ports::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult},
};

/// Thread-safe in-memory project repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<HashMap<ProjectId, Project>>>,
}

impl InMemoryProjectRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ProjectRepositoryResult<RwLockReadGuard<'_, HashMap<ProjectId, Project>>> {
        self.projects.read().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ProjectRepositoryResult<RwLockWriteGuard<'_, HashMap<ProjectId, Project>>> {
        self.projects.write().map_err(|err| {
            ProjectRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn store(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut projects = self.write()?;
        if projects.contains_key(&project.id()) {
            return Err(ProjectRepositoryError::DuplicateProject(project.id()));
        }
        projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update_details(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let mut projects = self.write()?;
        let stored = projects
            .get_mut(&project.id())
            .ok_or(ProjectRepositoryError::NotFound(project.id()))?;

        // The stored status wins over whatever the caller loaded earlier.
        let status = stored.status();
        let mut updated = project.clone();
        updated.record_derived_status(status);
        *stored = updated;
        Ok(())
    }

    async fn update_status(
        &self,
        id: ProjectId,
        status: ProjectStatus,
    ) -> ProjectRepositoryResult<()> {
        let mut projects = self.write()?;
        let stored = projects
            .get_mut(&id)
            .ok_or(ProjectRepositoryError::NotFound(id))?;
        stored.record_derived_status(status);
        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_by_organization(
        &self,
        organization: &OrganizationSlug,
    ) -> ProjectRepositoryResult<Vec<Project>> {
        let projects = self.read()?;
        let mut matching: Vec<Project> = projects
            .values()
            .filter(|project| project.organization() == organization)
            .cloned()
            .collect();
        matching.sort_by_key(|project| (project.created_at(), project.id()));
        Ok(matching)
    }
}

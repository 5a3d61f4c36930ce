//! Service layer for project creation and metadata edits.

use crate::project::{
    domain::{MemberId, OrganizationSlug, Project, ProjectDomainError, ProjectId, ProjectName},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    organization: String,
    name: String,
    description: Option<String>,
    members: Vec<MemberId>,
}

impl CreateProjectRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(organization: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            name: name.into(),
            description: None,
            members: Vec::new(),
        }
    }

    /// Sets the project description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial members.
    #[must_use]
    pub fn with_members(mut self, members: impl IntoIterator<Item = MemberId>) -> Self {
        self.members = members.into_iter().collect();
        self
    }
}

/// Request payload for editing project metadata.
///
/// Fields left unset keep their stored values. Status is not editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProjectRequest {
    name: Option<String>,
    description: Option<Option<String>>,
}

impl UpdateProjectRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the project.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Clears the description.
    #[must_use]
    pub fn clearing_description(mut self) -> Self {
        self.description = Some(None);
        self
    }
}

/// Service-level errors for project operations.
#[derive(Debug, Clone, Error)]
pub enum ProjectServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ProjectRepositoryError),
}

/// Result type for project service operations.
pub type ProjectServiceResult<T> = Result<T, ProjectServiceError>;

/// Project metadata orchestration service.
#[derive(Clone)]
pub struct ProjectService<P, C>
where
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<P>,
    clock: Arc<C>,
}

impl<P, C> ProjectService<P, C>
where
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(repository: Arc<P>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a project in the planning state.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Domain`] for an invalid name or slug and
    /// [`ProjectServiceError::Repository`] when persistence fails.
    pub async fn create(&self, request: CreateProjectRequest) -> ProjectServiceResult<Project> {
        let organization = OrganizationSlug::new(request.organization)?;
        let name = ProjectName::new(request.name)?;

        let mut project = Project::new(organization, name, &*self.clock).with_members(request.members);
        if let Some(description) = request.description {
            project = project.with_description(description);
        }

        self.repository.store(&project).await?;
        info!(project_id = %project.id(), organization = %project.organization(), "project created");
        Ok(project)
    }

    /// Applies a metadata edit. The derived status is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectRepositoryError::NotFound`] (wrapped) when the project
    /// does not exist and [`ProjectServiceError::Domain`] for an invalid name.
    pub async fn update_details(
        &self,
        id: ProjectId,
        request: UpdateProjectRequest,
    ) -> ProjectServiceResult<Project> {
        let mut project = self.require(id).await?;
        if let Some(raw_name) = request.name {
            project.rename(ProjectName::new(raw_name)?, &*self.clock);
        }
        if let Some(description) = request.description {
            project.describe(description, &*self.clock);
        }
        self.repository.update_details(&project).await?;
        Ok(project)
    }

    /// Adds a member to a project. Adding an existing member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Repository`] when the project does not
    /// exist or persistence fails.
    pub async fn add_member(
        &self,
        id: ProjectId,
        member: MemberId,
    ) -> ProjectServiceResult<Project> {
        let mut project = self.require(id).await?;
        if project.add_member(member, &*self.clock) {
            self.repository.update_details(&project).await?;
        }
        Ok(project)
    }

    /// Finds a project by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, id: ProjectId) -> ProjectServiceResult<Option<Project>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// Lists the projects of an organization, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectServiceError::Domain`] for an invalid slug and
    /// [`ProjectServiceError::Repository`] when the lookup fails.
    pub async fn list_for_organization(
        &self,
        organization: &str,
    ) -> ProjectServiceResult<Vec<Project>> {
        let slug = OrganizationSlug::new(organization)?;
        Ok(self.repository.find_by_organization(&slug).await?)
    }

    async fn require(&self, id: ProjectId) -> ProjectServiceResult<Project> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProjectServiceError::Repository(ProjectRepositoryError::NotFound(id)))
    }
}

//! Project aggregate root.

use super::{MemberId, OrganizationSlug, ProjectId, ProjectName, ProjectStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    organization: OrganizationSlug,
    name: ProjectName,
    description: Option<String>,
    status: ProjectStatus,
    members: Vec<MemberId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted project aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProjectData {
    /// Persisted project identifier.
    pub id: ProjectId,
    /// Owning organization.
    pub organization: OrganizationSlug,
    /// Persisted name.
    pub name: ProjectName,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted derived status.
    pub status: ProjectStatus,
    /// Persisted member list.
    pub members: Vec<MemberId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest metadata timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project in [`ProjectStatus::Planning`].
    #[must_use]
    pub fn new(organization: OrganizationSlug, name: ProjectName, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ProjectId::new(),
            organization,
            name,
            description: None,
            status: ProjectStatus::Planning,
            members: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Sets the initial description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial member list. Duplicate members are collapsed.
    #[must_use]
    pub fn with_members(mut self, members: impl IntoIterator<Item = MemberId>) -> Self {
        for member in members {
            if !self.members.contains(&member) {
                self.members.push(member);
            }
        }
        self
    }

    /// Reconstructs a project from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProjectData) -> Self {
        Self {
            id: data.id,
            organization: data.organization,
            name: data.name,
            description: data.description,
            status: data.status,
            members: data.members,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn organization(&self) -> &OrganizationSlug {
        &self.organization
    }

    /// Returns the project name.
    #[must_use]
    pub const fn name(&self) -> &ProjectName {
        &self.name
    }

    /// Returns the project description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the derived project status.
    #[must_use]
    pub const fn status(&self) -> ProjectStatus {
        self.status
    }

    /// Returns the project members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    /// Returns whether `member` belongs to the project.
    #[must_use]
    pub fn is_member(&self, member: MemberId) -> bool {
        self.members.contains(&member)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest metadata timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renames the project.
    pub fn rename(&mut self, name: ProjectName, clock: &impl Clock) {
        self.name = name;
        self.touch(clock);
    }

    /// Replaces the description. `None` clears it.
    pub fn describe(&mut self, description: Option<String>, clock: &impl Clock) {
        self.description = description;
        self.touch(clock);
    }

    /// Adds a member, returning `false` when they already belong to the
    /// project.
    pub fn add_member(&mut self, member: MemberId, clock: &impl Clock) -> bool {
        if self.is_member(member) {
            return false;
        }
        self.members.push(member);
        self.touch(clock);
        true
    }

    /// Records a status computed by the reconciler.
    ///
    /// Leaves `updated_at` untouched: the timestamp tracks metadata edits.
    pub(crate) fn record_derived_status(&mut self, status: ProjectStatus) {
        self.status = status;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

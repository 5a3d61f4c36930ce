//! Request payloads for task board mutations.

use crate::project::domain::{MemberId, ProjectId};
use crate::task::domain::{TaskPosition, TaskStatus};
use chrono::{DateTime, Utc};

/// Request payload for creating a task at the end of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub(super) project_id: ProjectId,
    pub(super) name: String,
    pub(super) status: TaskStatus,
    pub(super) description: Option<String>,
    pub(super) assignee: Option<MemberId>,
    pub(super) due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(project_id: ProjectId, name: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            project_id,
            name: name.into(),
            status,
            description: None,
            assignee: None,
            due_date: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Assigns the task to a project member.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: MemberId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Request payload for editing a task.
///
/// Unset fields keep their stored values. Nested options distinguish
/// "leave as is" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    pub(super) name: Option<String>,
    pub(super) description: Option<Option<String>>,
    pub(super) assignee: Option<Option<MemberId>>,
    pub(super) due_date: Option<Option<DateTime<Utc>>>,
    pub(super) status: Option<TaskStatus>,
    pub(super) position: Option<TaskPosition>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renames the task.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Replaces or clears the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: Option<MemberId>) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Replaces or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Moves the task to another column.
    ///
    /// Without [`Self::with_position`] the task lands at the end of the
    /// column.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Moves the task to an explicit slot.
    #[must_use]
    pub const fn with_position(mut self, position: TaskPosition) -> Self {
        self.position = Some(position);
        self
    }
}

//! Task aggregate root.

use super::{TaskId, TaskName, TaskPlacement, TaskPosition, TaskStatus};
use crate::project::domain::{MemberId, ProjectId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    name: TaskName,
    description: Option<String>,
    status: TaskStatus,
    position: TaskPosition,
    assignee: Option<MemberId>,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for creating a task that has already been placed on the
/// board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning project.
    pub project_id: ProjectId,
    /// Task name.
    pub name: TaskName,
    /// Initial column.
    pub status: TaskStatus,
    /// Initial slot inside the column.
    pub position: TaskPosition,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional assignee.
    pub assignee: Option<MemberId>,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted owning project.
    pub project_id: ProjectId,
    /// Persisted name.
    pub name: TaskName,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted column.
    pub status: TaskStatus,
    /// Persisted slot.
    pub position: TaskPosition,
    /// Persisted assignee, if any.
    pub assignee: Option<MemberId>,
    /// Persisted due date, if any.
    pub due_date: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task.
    #[must_use]
    pub fn new(data: NewTask, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            project_id: data.project_id,
            name: data.name,
            description: data.description,
            status: data.status,
            position: data.position,
            assignee: data.assignee,
            due_date: data.due_date,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            name: data.name,
            description: data.description,
            status: data.status,
            position: data.position,
            assignee: data.assignee,
            due_date: data.due_date,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the board column.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the slot inside the column.
    #[must_use]
    pub const fn position(&self) -> TaskPosition {
        self.position
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<MemberId> {
        self.assignee
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renames the task.
    pub fn rename(&mut self, name: TaskName, clock: &impl Clock) {
        self.name = name;
        self.touch(clock);
    }

    /// Replaces the description. `None` clears it.
    pub fn describe(&mut self, description: Option<String>, clock: &impl Clock) {
        self.description = description;
        self.touch(clock);
    }

    /// Replaces the assignee. `None` unassigns the task.
    pub fn assign(&mut self, assignee: Option<MemberId>, clock: &impl Clock) {
        self.assignee = assignee;
        self.touch(clock);
    }

    /// Replaces the due date. `None` clears it.
    pub fn schedule(&mut self, due_date: Option<DateTime<Utc>>, clock: &impl Clock) {
        self.due_date = due_date;
        self.touch(clock);
    }

    /// Moves the task to a column and slot.
    pub fn move_to(&mut self, status: TaskStatus, position: TaskPosition, clock: &impl Clock) {
        self.status = status;
        self.position = position;
        self.touch(clock);
    }

    /// Applies a committed reposition placement stamped at `timestamp`.
    pub(crate) fn apply_placement(
        &mut self,
        placement: &TaskPlacement,
        timestamp: DateTime<Utc>,
    ) {
        self.status = placement.status;
        self.position = placement.position;
        self.updated_at = timestamp;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

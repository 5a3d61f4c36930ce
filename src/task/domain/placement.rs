//! Bulk reposition requests and their confirmation rows.

use super::{QUARANTINE_BASE, TaskDomainError, TaskId, TaskName, TaskPosition, TaskStatus};
use crate::project::domain::ProjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Target column and slot for one task in a reposition batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlacement {
    /// Task to move.
    pub task_id: TaskId,
    /// Target column.
    pub status: TaskStatus,
    /// Target slot inside the column.
    pub position: TaskPosition,
}

impl TaskPlacement {
    /// Creates a placement.
    #[must_use]
    pub const fn new(task_id: TaskId, status: TaskStatus, position: TaskPosition) -> Self {
        Self {
            task_id,
            status,
            position,
        }
    }
}

/// Validated, non-empty list of placements applied as one all-or-nothing
/// transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositionBatch {
    placements: Vec<TaskPlacement>,
}

impl RepositionBatch {
    /// Largest batch accepted in one transaction.
    pub const MAX_SIZE: usize = 10_000;

    /// Validates a list of placements.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyBatch`] for an empty list,
    /// [`TaskDomainError::BatchTooLarge`] above [`Self::MAX_SIZE`], and
    /// [`TaskDomainError::DuplicatePlacement`] when a task appears twice.
    pub fn new(placements: impl IntoIterator<Item = TaskPlacement>) -> Result<Self, TaskDomainError> {
        let collected: Vec<TaskPlacement> = placements.into_iter().collect();
        if collected.is_empty() {
            return Err(TaskDomainError::EmptyBatch);
        }
        if collected.len() > Self::MAX_SIZE {
            return Err(TaskDomainError::BatchTooLarge {
                actual: collected.len(),
                max: Self::MAX_SIZE,
            });
        }

        let mut seen = HashSet::with_capacity(collected.len());
        for placement in &collected {
            if !seen.insert(placement.task_id) {
                return Err(TaskDomainError::DuplicatePlacement(placement.task_id));
            }
        }

        Ok(Self {
            placements: collected,
        })
    }

    /// Returns the placements in request order.
    #[must_use]
    pub fn placements(&self) -> &[TaskPlacement] {
        &self.placements
    }

    /// Returns the number of placements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Returns whether the batch holds no placements.
    ///
    /// [`Self::new`] rejects empty input, so this is `false` for every
    /// constructed batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Returns the referenced task identifiers in request order.
    #[must_use]
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.placements.iter().map(|placement| placement.task_id).collect()
    }

    /// Pairs each placement with its quarantine key, `QUARANTINE_BASE + i`.
    pub fn quarantine_plan(&self) -> impl Iterator<Item = (&TaskPlacement, i64)> {
        self.placements.iter().zip(QUARANTINE_BASE..)
    }
}

/// Task state read back after a reposition commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositionedTask {
    /// Task identifier.
    pub id: TaskId,
    /// Task name.
    pub name: TaskName,
    /// Owning project.
    pub project_id: ProjectId,
    /// Committed column.
    pub status: TaskStatus,
    /// Committed slot.
    pub position: TaskPosition,
}

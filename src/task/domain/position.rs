//! Ordering key of a task inside its board column.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Start of the quarantine keyspace used while a reorder is in flight.
///
/// Placement `i` of a batch is parked at `QUARANTINE_BASE + i`. Every value
/// reachable this way is negative, and [`TaskPosition`] rejects negatives, so
/// parked rows can never collide with a resting task.
pub const QUARANTINE_BASE: i64 = -1_000_000_000;

/// Non-negative ordering key, unique within a `(project, status)` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TaskPosition(i64);

impl TaskPosition {
    /// Gap left between tasks appended to a column.
    pub const COLUMN_SPACING: i64 = 1000;

    /// Creates a validated position.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NegativePosition`] for values below zero.
    pub const fn new(value: i64) -> Result<Self, TaskDomainError> {
        if value < 0 {
            return Err(TaskDomainError::NegativePosition(value));
        }
        Ok(Self(value))
    }

    /// Position of the first task appended to an empty column.
    #[must_use]
    pub const fn first() -> Self {
        Self(Self::COLUMN_SPACING)
    }

    /// Position that appends a task after `last`, or the first slot when the
    /// column is empty.
    #[must_use]
    pub const fn end_of_column(last: Option<Self>) -> Self {
        match last {
            Some(position) => Self(position.0.saturating_add(Self::COLUMN_SPACING)),
            None => Self::first(),
        }
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for TaskPosition {
    type Error = TaskDomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskPosition> for i64 {
    fn from(position: TaskPosition) -> Self {
        position.0
    }
}

impl fmt::Display for TaskPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

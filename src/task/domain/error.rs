//! Error types for task domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyTaskName,

    /// The task name exceeds the persisted column width.
    #[error("task name exceeds {max} characters")]
    TaskNameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// Negative positions are reserved for in-flight reorders.
    #[error("task position must not be negative, got {0}")]
    NegativePosition(i64),

    /// A reposition batch must move at least one task.
    #[error("reposition batch must contain at least one task")]
    EmptyBatch,

    /// A reposition batch exceeds the supported size.
    #[error("reposition batch has {actual} tasks, exceeds limit of {max}")]
    BatchTooLarge {
        /// Number of placements supplied.
        actual: usize,
        /// Maximum number of placements accepted.
        max: usize,
    },

    /// The same task appears more than once in a reposition batch.
    #[error("task {0} appears more than once in the reposition batch")]
    DuplicatePlacement(TaskId),
}

/// Error returned while parsing task statuses from persistence or requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

//! Domain model for tasks on a project board.
//!
//! Tasks live in one column of a project's kanban board, identified by their
//! [`TaskStatus`], and are ordered inside that column by [`TaskPosition`].
//! Bulk reordering is expressed as a validated [`RepositionBatch`].

mod error;
mod ids;
mod placement;
mod position;
mod status;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{TaskId, TaskName};
pub use placement::{RepositionBatch, RepositionedTask, TaskPlacement};
pub use position::{QUARANTINE_BASE, TaskPosition};
pub use status::TaskStatus;
pub use task::{NewTask, PersistedTaskData, Task};

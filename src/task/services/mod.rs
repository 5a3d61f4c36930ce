//! Application services for the task board.

mod board;
mod requests;

pub use board::{
    RepositionOutcome, TaskBoardError, TaskBoardResult, TaskBoardService, TaskChange,
};
pub use requests::{CreateTaskRequest, UpdateTaskRequest};

//! Project status and its derivation from task statuses.

use super::ParseProjectStatusError;
use crate::task::domain::TaskStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate project status.
///
/// Once a project has tasks this value is owned by the reconciler and is
/// always the result of [`derive_project_status`] over the task set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// The project has no tasks yet.
    Planning,
    /// Work is queued but nothing is being worked on.
    Active,
    /// At least one task is in progress or in review.
    InProgress,
    /// Fallback status; not produced for any combination of task statuses.
    OnHold,
    /// Every task is done.
    Completed,
}

impl ProjectStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::OnHold => "on_hold",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProjectStatus {
    type Error = ParseProjectStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "planning" => Ok(Self::Planning),
            "active" => Ok(Self::Active),
            "in_progress" => Ok(Self::InProgress),
            "on_hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseProjectStatusError(value.to_owned())),
        }
    }
}

/// Derives a project status from the statuses of its tasks.
///
/// Rules are applied in order and the first match wins:
///
/// 1. no tasks: [`ProjectStatus::Planning`]
/// 2. every task done: [`ProjectStatus::Completed`]
/// 3. any task in progress or in review: [`ProjectStatus::InProgress`]
/// 4. any task in backlog or to do: [`ProjectStatus::Active`]
/// 5. otherwise: [`ProjectStatus::OnHold`]
///
/// The function is pure; the order of `statuses` does not matter.
#[must_use]
pub fn derive_project_status(statuses: impl IntoIterator<Item = TaskStatus>) -> ProjectStatus {
    let mut seen_any = false;
    let mut all_done = true;
    let mut has_active_work = false;
    let mut has_queued_work = false;

    for status in statuses {
        seen_any = true;
        match status {
            TaskStatus::Done => {}
            TaskStatus::InProgress | TaskStatus::InReview => {
                all_done = false;
                has_active_work = true;
            }
            TaskStatus::Backlog | TaskStatus::Todo => {
                all_done = false;
                has_queued_work = true;
            }
        }
    }

    if !seen_any {
        ProjectStatus::Planning
    } else if all_done {
        ProjectStatus::Completed
    } else if has_active_work {
        ProjectStatus::InProgress
    } else if has_queued_work {
        ProjectStatus::Active
    } else {
        ProjectStatus::OnHold
    }
}

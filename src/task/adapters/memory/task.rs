//! In-memory repository for task board tests.
//!
//! Mirrors the `PostgreSQL` schema closely enough to exercise the reorder
//! protocol: a slot index plays the role of the unique
//! `(project_id, status, position)` index, and a reposition runs against a
//! private copy of the state that only replaces the shared state once every
//! step has succeeded.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::project::domain::ProjectId;
use crate::task::{
    domain::{
        RepositionBatch, RepositionedTask, Task, TaskId, TaskPosition, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Column slot key. The position is a raw `i64` so quarantine keys fit.
type SlotKey = (ProjectId, TaskStatus, i64);

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Clone, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    slots: HashMap<SlotKey, TaskId>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

fn slot_of(task: &Task) -> SlotKey {
    (task.project_id(), task.status(), task.position().value())
}

impl InMemoryTaskState {
    /// Claims `slot` for `task_id`, failing when another task holds it.
    fn claim_slot(&mut self, slot: SlotKey, task_id: TaskId) -> TaskRepositoryResult<()> {
        match self.slots.get(&slot) {
            Some(holder) if *holder != task_id => {
                let (project_id, status, raw_position) = slot;
                let position =
                    TaskPosition::new(raw_position).map_err(TaskRepositoryError::persistence)?;
                Err(TaskRepositoryError::PositionConflict {
                    project_id,
                    status,
                    position,
                })
            }
            _ => {
                self.slots.insert(slot, task_id);
                Ok(())
            }
        }
    }

    fn release_slot(&mut self, slot: &SlotKey, task_id: TaskId) {
        if self.slots.get(slot) == Some(&task_id) {
            self.slots.remove(slot);
        }
    }

    fn reposition(
        &mut self,
        batch: &RepositionBatch,
        timestamp: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<RepositionedTask>> {
        let missing: Vec<TaskId> = batch
            .task_ids()
            .into_iter()
            .filter(|id| !self.tasks.contains_key(id))
            .collect();
        if !missing.is_empty() {
            return Err(TaskRepositoryError::MissingTasks(missing));
        }

        // Phase one: park every moved task in the quarantine keyspace under
        // its target status.
        let mut parked: Vec<(TaskId, SlotKey)> = Vec::with_capacity(batch.len());
        for (placement, quarantine_key) in batch.quarantine_plan() {
            let task = self
                .tasks
                .get(&placement.task_id)
                .ok_or(TaskRepositoryError::NotFound(placement.task_id))?;
            let current_slot = slot_of(task);
            let quarantine_slot = (task.project_id(), placement.status, quarantine_key);
            self.release_slot(&current_slot, placement.task_id);
            self.claim_slot(quarantine_slot, placement.task_id)?;
            parked.push((placement.task_id, quarantine_slot));
        }

        // Phase two: move each parked task to its real target slot.
        for (placement, (task_id, quarantine_slot)) in batch.placements().iter().zip(parked) {
            let task = self
                .tasks
                .get_mut(&task_id)
                .ok_or(TaskRepositoryError::NotFound(task_id))?;
            task.apply_placement(placement, timestamp);
            let target_slot = slot_of(task);
            self.release_slot(&quarantine_slot, task_id);
            self.claim_slot(target_slot, task_id)?;
        }

        batch
            .placements()
            .iter()
            .map(|placement| {
                let task = self
                    .tasks
                    .get(&placement.task_id)
                    .ok_or(TaskRepositoryError::NotFound(placement.task_id))?;
                Ok(RepositionedTask {
                    id: task.id(),
                    name: task.name().clone(),
                    project_id: task.project_id(),
                    status: task.status(),
                    position: task.position(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.claim_slot(slot_of(task), task.id())?;
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let old_slot = state
            .tasks
            .get(&task.id())
            .map(slot_of)
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;

        let new_slot = slot_of(task);
        if new_slot != old_slot {
            state.claim_slot(new_slot, task.id())?;
            state.release_slot(&old_slot, task.id());
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn remove(&self, id: TaskId) -> TaskRepositoryResult<Task> {
        let mut state = self.write()?;
        let removed = state
            .tasks
            .remove(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        state.release_slot(&slot_of(&removed), id);
        Ok(removed)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn find_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.project_id() == project_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.status(), task.position()));
        Ok(tasks)
    }

    async fn statuses_for_project(
        &self,
        project_id: ProjectId,
    ) -> TaskRepositoryResult<Vec<TaskStatus>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.project_id() == project_id)
            .map(Task::status)
            .collect())
    }

    async fn last_position(
        &self,
        project_id: ProjectId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Option<TaskPosition>> {
        let state = self.read()?;
        Ok(state
            .tasks
            .values()
            .filter(|task| task.project_id() == project_id && task.status() == status)
            .map(Task::position)
            .max())
    }

    async fn reposition(
        &self,
        batch: &RepositionBatch,
        timestamp: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<RepositionedTask>> {
        let mut state = self.write()?;
        let mut working_copy = (*state).clone();
        let repositioned = working_copy.reposition(batch, timestamp)?;
        *state = working_copy;
        Ok(repositioned)
    }
}

//! `PostgreSQL` repository implementation for task board storage.

use super::{
    models::{NewTaskRow, RepositionedRow, TaskRow},
    schema::tasks,
};
use crate::database::PgPool;
use crate::project::domain::{MemberId, ProjectId};
use crate::task::{
    domain::{
        PersistedTaskData, RepositionBatch, RepositionedTask, Task, TaskId, TaskName,
        TaskPlacement, TaskPosition, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const COLUMN_POSITION_INDEX: &str = "idx_tasks_column_position_unique";

/// Wait and execution limits for a reposition transaction.
///
/// `max_wait` bounds how long the repository waits for a pooled connection;
/// `timeout` is applied to every statement and lock wait inside the
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositionBudget {
    /// Longest wait for a pooled connection.
    pub max_wait: Duration,
    /// Statement and lock timeout inside the transaction.
    pub timeout: Duration,
}

impl RepositionBudget {
    /// Creates a budget from explicit limits.
    #[must_use]
    pub const fn new(max_wait: Duration, timeout: Duration) -> Self {
        Self { max_wait, timeout }
    }
}

impl Default for RepositionBudget {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(20))
    }
}

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
    budget: RepositionBudget,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            budget: RepositionBudget::default(),
        }
    }

    /// Replaces the reposition transaction budget.
    #[must_use]
    pub const fn with_budget(mut self, budget: RepositionBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Returns the reposition transaction budget.
    #[must_use]
    pub const fn budget(&self) -> RepositionBudget {
        self.budget
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }

    async fn run_budgeted<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        let max_wait = self.budget.max_wait;
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get_timeout(max_wait)
                .map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let new_row = to_new_row(task);
        let task_id = task.id();
        let slot = Slot::of(task);

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_column_position_violation(info.as_ref()) =>
                    {
                        slot.conflict()
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let slot = Slot::of(task);
        let name = task.name().as_str().to_owned();
        let description = task.description().map(str::to_owned);
        let assignee = task.assignee().map(MemberId::into_inner);
        let due_date = task.due_date();
        let updated_at = task.updated_at();

        self.run_blocking(move |connection| {
            let affected =
                diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                    .set((
                        tasks::name.eq(name),
                        tasks::description.eq(description),
                        tasks::status.eq(slot.status.as_str()),
                        tasks::position.eq(slot.position.value()),
                        tasks::assignee_id.eq(assignee),
                        tasks::due_date.eq(due_date),
                        tasks::updated_at.eq(updated_at),
                    ))
                    .execute(connection)
                    .map_err(|err| map_slot_error(err, slot))?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn remove(&self, id: TaskId) -> TaskRepositoryResult<Task> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()?;
            removed
                .ok_or(TaskRepositoryError::NotFound(id))
                .and_then(row_to_task)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?
                .map(row_to_task)
                .transpose()
        })
        .await
    }

    async fn find_by_project(&self, project_id: ProjectId) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            let mut loaded = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskRepositoryResult<Vec<_>>>()?;
            // Column order follows the board, not the storage strings.
            loaded.sort_by_key(|task| (task.status(), task.position()));
            Ok(loaded)
        })
        .await
    }

    async fn statuses_for_project(
        &self,
        project_id: ProjectId,
    ) -> TaskRepositoryResult<Vec<TaskStatus>> {
        self.run_blocking(move |connection| {
            let raw: Vec<String> = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .select(tasks::status)
                .load(connection)?;
            raw.iter()
                .map(|value| {
                    TaskStatus::try_from(value.as_str()).map_err(TaskRepositoryError::persistence)
                })
                .collect()
        })
        .await
    }

    async fn last_position(
        &self,
        project_id: ProjectId,
        status: TaskStatus,
    ) -> TaskRepositoryResult<Option<TaskPosition>> {
        self.run_blocking(move |connection| {
            let highest: Option<i64> = tasks::table
                .filter(tasks::project_id.eq(project_id.into_inner()))
                .filter(tasks::status.eq(status.as_str()))
                .select(diesel::dsl::max(tasks::position))
                .first(connection)?;
            highest
                .map(|value| TaskPosition::new(value).map_err(TaskRepositoryError::persistence))
                .transpose()
        })
        .await
    }

    async fn reposition(
        &self,
        batch: &RepositionBatch,
        timestamp: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<RepositionedTask>> {
        let owned_batch = batch.clone();
        let timeout_ms = self.budget.timeout.as_millis();

        self.run_budgeted(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                apply_budget(tx, timeout_ms)?;
                let owners = ensure_tasks_exist(tx, &owned_batch)?;
                quarantine_phase(tx, &owned_batch)?;
                debug!(task_count = owned_batch.len(), "quarantine phase complete");
                final_phase(tx, &owned_batch, &owners, timestamp)?;
                read_back(tx, &owned_batch)
            })
        })
        .await
    }
}

/// Column slot of a task, used to report position conflicts.
#[derive(Debug, Clone, Copy)]
struct Slot {
    project_id: ProjectId,
    status: TaskStatus,
    position: TaskPosition,
}

impl Slot {
    fn of(task: &Task) -> Self {
        Self {
            project_id: task.project_id(),
            status: task.status(),
            position: task.position(),
        }
    }

    const fn conflict(self) -> TaskRepositoryError {
        TaskRepositoryError::PositionConflict {
            project_id: self.project_id,
            status: self.status,
            position: self.position,
        }
    }
}

fn is_column_position_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == COLUMN_POSITION_INDEX)
}

fn map_slot_error(err: DieselError, slot: Slot) -> TaskRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_column_position_violation(info.as_ref()) =>
        {
            slot.conflict()
        }
        _ => TaskRepositoryError::persistence(err),
    }
}

fn apply_budget(connection: &mut PgConnection, timeout_ms: u128) -> TaskRepositoryResult<()> {
    diesel::sql_query(format!("SET LOCAL statement_timeout = {timeout_ms}"))
        .execute(connection)?;
    diesel::sql_query(format!("SET LOCAL lock_timeout = {timeout_ms}")).execute(connection)?;
    Ok(())
}

/// Confirms every referenced task exists and returns each task's project.
fn ensure_tasks_exist(
    connection: &mut PgConnection,
    batch: &RepositionBatch,
) -> TaskRepositoryResult<HashMap<TaskId, ProjectId>> {
    let ids: Vec<uuid::Uuid> = batch.task_ids().into_iter().map(TaskId::into_inner).collect();
    let found: Vec<(uuid::Uuid, uuid::Uuid)> = tasks::table
        .filter(tasks::id.eq_any(&ids))
        .select((tasks::id, tasks::project_id))
        .load(connection)?;

    let owners: HashMap<TaskId, ProjectId> = found
        .into_iter()
        .map(|(id, project_id)| (TaskId::from_uuid(id), ProjectId::from_uuid(project_id)))
        .collect();
    if owners.len() == batch.len() {
        return Ok(owners);
    }

    let missing = batch
        .task_ids()
        .into_iter()
        .filter(|id| !owners.contains_key(id))
        .collect();
    Err(TaskRepositoryError::MissingTasks(missing))
}

fn quarantine_phase(
    connection: &mut PgConnection,
    batch: &RepositionBatch,
) -> TaskRepositoryResult<()> {
    for (placement, quarantine_key) in batch.quarantine_plan() {
        diesel::sql_query("UPDATE tasks SET status = $1, position = $2 WHERE id = $3")
            .bind::<diesel::sql_types::Varchar, _>(placement.status.as_str())
            .bind::<diesel::sql_types::BigInt, _>(quarantine_key)
            .bind::<diesel::sql_types::Uuid, _>(placement.task_id.into_inner())
            .execute(connection)?;
    }
    Ok(())
}

fn final_phase(
    connection: &mut PgConnection,
    batch: &RepositionBatch,
    owners: &HashMap<TaskId, ProjectId>,
    timestamp: DateTime<Utc>,
) -> TaskRepositoryResult<()> {
    for placement in batch.placements() {
        let slot = placement_slot(placement, owners)?;
        diesel::sql_query("UPDATE tasks SET position = $1, updated_at = $2 WHERE id = $3")
            .bind::<diesel::sql_types::BigInt, _>(placement.position.value())
            .bind::<diesel::sql_types::Timestamptz, _>(timestamp)
            .bind::<diesel::sql_types::Uuid, _>(placement.task_id.into_inner())
            .execute(connection)
            .map_err(|err| map_slot_error(err, slot))?;
    }
    Ok(())
}

fn placement_slot(
    placement: &TaskPlacement,
    owners: &HashMap<TaskId, ProjectId>,
) -> TaskRepositoryResult<Slot> {
    let project_id = owners
        .get(&placement.task_id)
        .copied()
        .ok_or(TaskRepositoryError::NotFound(placement.task_id))?;
    Ok(Slot {
        project_id,
        status: placement.status,
        position: placement.position,
    })
}

fn read_back(
    connection: &mut PgConnection,
    batch: &RepositionBatch,
) -> TaskRepositoryResult<Vec<RepositionedTask>> {
    let ids: Vec<uuid::Uuid> = batch.task_ids().into_iter().map(TaskId::into_inner).collect();
    let rows = tasks::table
        .filter(tasks::id.eq_any(&ids))
        .select(RepositionedRow::as_select())
        .load::<RepositionedRow>(connection)?;

    let mut by_id: HashMap<uuid::Uuid, RepositionedRow> =
        rows.into_iter().map(|row| (row.id, row)).collect();
    ids.iter()
        .map(|id| {
            let row = by_id
                .remove(id)
                .ok_or(TaskRepositoryError::NotFound(TaskId::from_uuid(*id)))?;
            row_to_repositioned(row)
        })
        .collect()
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        project_id: task.project_id().into_inner(),
        name: task.name().as_str().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        position: task.position().value(),
        assignee_id: task.assignee().map(MemberId::into_inner),
        due_date: task.due_date(),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        project_id,
        name: persisted_name,
        description,
        status: persisted_status,
        position: persisted_position,
        assignee_id,
        due_date,
        created_at,
        updated_at,
    } = row;

    let name = TaskName::new(persisted_name).map_err(TaskRepositoryError::persistence)?;
    let status = TaskStatus::try_from(persisted_status.as_str())
        .map_err(TaskRepositoryError::persistence)?;
    let position =
        TaskPosition::new(persisted_position).map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        project_id: ProjectId::from_uuid(project_id),
        name,
        description,
        status,
        position,
        assignee: assignee_id.map(MemberId::from_uuid),
        due_date,
        created_at,
        updated_at,
    }))
}

fn row_to_repositioned(row: RepositionedRow) -> TaskRepositoryResult<RepositionedTask> {
    Ok(RepositionedTask {
        id: TaskId::from_uuid(row.id),
        name: TaskName::new(row.name).map_err(TaskRepositoryError::persistence)?,
        project_id: ProjectId::from_uuid(row.project_id),
        status: TaskStatus::try_from(row.status.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        position: TaskPosition::new(row.position).map_err(TaskRepositoryError::persistence)?,
    })
}

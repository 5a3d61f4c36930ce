//! `PostgreSQL` repository implementation for project storage.

use super::{
    models::{NewProjectRow, ProjectMemberRow, ProjectRow},
    schema::{project_members, projects},
};
use crate::database::PgPool;
use crate::project::{
    domain::{
        MemberId, OrganizationSlug, PersistedProjectData, Project, ProjectId, ProjectName,
        ProjectStatus,
    },
    ports::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;

/// `PostgreSQL`-backed project repository.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ProjectRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProjectRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProjectRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ProjectRepositoryError::persistence)?
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn store(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let project_id = project.id();
        let new_row = to_new_row(project);
        let member_rows = to_member_rows(project)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, ProjectRepositoryError, _>(|tx| {
                diesel::insert_into(projects::table)
                    .values(&new_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            ProjectRepositoryError::DuplicateProject(project_id)
                        }
                        _ => ProjectRepositoryError::persistence(err),
                    })?;
                insert_members(tx, &member_rows)?;
                Ok(())
            })
        })
        .await
    }

    async fn update_details(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let project_id = project.id();
        let uuid = project_id.into_inner();
        let name = project.name().as_str().to_owned();
        let description = project.description().map(str::to_owned);
        let updated_at = project.updated_at();
        let member_rows = to_member_rows(project)?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, ProjectRepositoryError, _>(|tx| {
                let affected = diesel::update(projects::table.filter(projects::id.eq(uuid)))
                    .set((
                        projects::name.eq(name),
                        projects::description.eq(description),
                        projects::updated_at.eq(updated_at),
                    ))
                    .execute(tx)?;
                if affected == 0 {
                    return Err(ProjectRepositoryError::NotFound(project_id));
                }

                diesel::delete(project_members::table.filter(project_members::project_id.eq(uuid)))
                    .execute(tx)?;
                insert_members(tx, &member_rows)?;
                Ok(())
            })
        })
        .await
    }

    async fn update_status(
        &self,
        id: ProjectId,
        status: ProjectStatus,
    ) -> ProjectRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::update(projects::table.filter(projects::id.eq(id.into_inner())))
                .set(projects::status.eq(status.as_str()))
                .execute(connection)?;
            if affected == 0 {
                return Err(ProjectRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()?;
            let Some(project_row) = row else {
                return Ok(None);
            };
            let mut members = load_members(connection, &[project_row.id])?;
            let project_members = members.remove(&project_row.id).unwrap_or_default();
            row_to_project(project_row, project_members).map(Some)
        })
        .await
    }

    async fn find_by_organization(
        &self,
        organization: &OrganizationSlug,
    ) -> ProjectRepositoryResult<Vec<Project>> {
        let slug = organization.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = projects::table
                .filter(projects::organization_slug.eq(slug))
                .order((projects::created_at.asc(), projects::id.asc()))
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)?;
            let ids: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();
            let mut members = load_members(connection, &ids)?;
            rows.into_iter()
                .map(|row| {
                    let project_members = members.remove(&row.id).unwrap_or_default();
                    row_to_project(row, project_members)
                })
                .collect()
        })
        .await
    }
}

fn to_new_row(project: &Project) -> NewProjectRow {
    NewProjectRow {
        id: project.id().into_inner(),
        organization_slug: project.organization().as_str().to_owned(),
        name: project.name().as_str().to_owned(),
        description: project.description().map(str::to_owned),
        status: project.status().as_str().to_owned(),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

fn to_member_rows(project: &Project) -> ProjectRepositoryResult<Vec<ProjectMemberRow>> {
    let project_id = project.id().into_inner();
    project
        .members()
        .iter()
        .enumerate()
        .map(|(index, member)| {
            let ordinal = i32::try_from(index).map_err(ProjectRepositoryError::persistence)?;
            Ok(ProjectMemberRow {
                project_id,
                member_id: member.into_inner(),
                ordinal,
            })
        })
        .collect()
}

fn insert_members(
    connection: &mut PgConnection,
    rows: &[ProjectMemberRow],
) -> ProjectRepositoryResult<()> {
    if rows.is_empty() {
        return Ok(());
    }
    diesel::insert_into(project_members::table)
        .values(rows)
        .execute(connection)?;
    Ok(())
}

fn load_members(
    connection: &mut PgConnection,
    project_ids: &[uuid::Uuid],
) -> ProjectRepositoryResult<HashMap<uuid::Uuid, Vec<MemberId>>> {
    let rows = project_members::table
        .filter(project_members::project_id.eq_any(project_ids))
        .order((project_members::project_id, project_members::ordinal.asc()))
        .select(ProjectMemberRow::as_select())
        .load::<ProjectMemberRow>(connection)?;

    let mut grouped: HashMap<uuid::Uuid, Vec<MemberId>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.project_id)
            .or_default()
            .push(MemberId::from_uuid(row.member_id));
    }
    Ok(grouped)
}

fn row_to_project(row: ProjectRow, members: Vec<MemberId>) -> ProjectRepositoryResult<Project> {
    let ProjectRow {
        id,
        organization_slug,
        name: persisted_name,
        description,
        status: persisted_status,
        created_at,
        updated_at,
    } = row;

    let organization =
        OrganizationSlug::new(organization_slug).map_err(ProjectRepositoryError::persistence)?;
    let name = ProjectName::new(persisted_name).map_err(ProjectRepositoryError::persistence)?;
    let status = ProjectStatus::try_from(persisted_status.as_str())
        .map_err(ProjectRepositoryError::persistence)?;

    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(id),
        organization,
        name,
        description,
        status,
        members,
        created_at,
        updated_at,
    }))
}

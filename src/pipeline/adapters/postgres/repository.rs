//! `PostgreSQL` repository implementation for pipeline entities.

use super::{
    models::{NewPipelineEntityRow, PipelineEntityRow},
    schema::pipeline_entities,
};
use crate::pipeline::{
    domain::{
        EntityKind, OrganizationId, PersistedEntityData, PipelineEntity, PipelineEntityId, Stage,
    },
    ports::{
        PipelineEntityRepository, PipelineEntityRepositoryError, PipelineEntityRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by pipeline adapters.
pub type PipelinePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed pipeline entity repository.
#[derive(Debug, Clone)]
pub struct PostgresPipelineEntityRepository {
    pool: PipelinePgPool,
}

impl PostgresPipelineEntityRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PipelinePgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> PipelineEntityRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> PipelineEntityRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(PipelineEntityRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(PipelineEntityRepositoryError::persistence)?
    }
}

#[async_trait]
impl PipelineEntityRepository for PostgresPipelineEntityRepository {
    async fn store(&self, entity: &PipelineEntity) -> PipelineEntityRepositoryResult<()> {
        let entity_id = entity.id();
        let new_row = to_new_row(entity);

        self.run_blocking(move |connection| {
            diesel::insert_into(pipeline_entities::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        PipelineEntityRepositoryError::DuplicateEntity(entity_id)
                    }
                    _ => PipelineEntityRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: PipelineEntityId,
    ) -> PipelineEntityRepositoryResult<Option<PipelineEntity>> {
        self.run_blocking(move |connection| {
            let row = find_row(connection, id)?;
            row.map(row_to_entity).transpose()
        })
        .await
    }

    async fn update(&self, entity: &PipelineEntity) -> PipelineEntityRepositoryResult<()> {
        let entity_id = entity.id();
        let display_name = entity.display_name().to_owned();
        let active = entity.is_active();
        let updated_at = entity.updated_at();

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                pipeline_entities::table.filter(pipeline_entities::id.eq(entity_id.into_inner())),
            )
            .set((
                pipeline_entities::display_name.eq(display_name),
                pipeline_entities::active.eq(active),
                pipeline_entities::updated_at.eq(updated_at),
            ))
            .execute(connection)
            .map_err(PipelineEntityRepositoryError::persistence)?;

            if affected == 0 {
                return Err(PipelineEntityRepositoryError::NotFound(entity_id));
            }
            Ok(())
        })
        .await
    }

    async fn update_stage(
        &self,
        entity: &PipelineEntity,
        expected: Stage,
    ) -> PipelineEntityRepositoryResult<()> {
        let entity_id = entity.id();
        let next_stage = entity.stage();
        let updated_at = entity.updated_at();

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                pipeline_entities::table
                    .filter(pipeline_entities::id.eq(entity_id.into_inner()))
                    .filter(pipeline_entities::stage.eq(expected.as_str())),
            )
            .set((
                pipeline_entities::stage.eq(next_stage.as_str()),
                pipeline_entities::updated_at.eq(updated_at),
            ))
            .execute(connection)
            .map_err(PipelineEntityRepositoryError::persistence)?;

            if affected > 0 {
                return Ok(());
            }

            // Zero rows: either the entity is gone or another writer moved it.
            let current = find_row(connection, entity_id)?
                .ok_or(PipelineEntityRepositoryError::NotFound(entity_id))?;
            let actual = Stage::try_from(current.stage.as_str())
                .map_err(PipelineEntityRepositoryError::persistence)?;
            Err(PipelineEntityRepositoryError::StageConflict {
                entity_id,
                expected,
                actual,
            })
        })
        .await
    }
}

fn find_row(
    connection: &mut PgConnection,
    id: PipelineEntityId,
) -> PipelineEntityRepositoryResult<Option<PipelineEntityRow>> {
    pipeline_entities::table
        .filter(pipeline_entities::id.eq(id.into_inner()))
        .select(PipelineEntityRow::as_select())
        .first::<PipelineEntityRow>(connection)
        .optional()
        .map_err(PipelineEntityRepositoryError::persistence)
}

fn to_new_row(entity: &PipelineEntity) -> NewPipelineEntityRow {
    NewPipelineEntityRow {
        id: entity.id().into_inner(),
        kind: entity.kind().as_str().to_owned(),
        display_name: entity.display_name().to_owned(),
        stage: entity.stage().as_str().to_owned(),
        organization_id: entity.organization_id().into_inner(),
        active: entity.is_active(),
        created_at: entity.created_at(),
        updated_at: entity.updated_at(),
    }
}

fn row_to_entity(row: PipelineEntityRow) -> PipelineEntityRepositoryResult<PipelineEntity> {
    let kind =
        EntityKind::try_from(row.kind.as_str()).map_err(PipelineEntityRepositoryError::persistence)?;
    let stage =
        Stage::try_from(row.stage.as_str()).map_err(PipelineEntityRepositoryError::persistence)?;

    Ok(PipelineEntity::from_persisted(PersistedEntityData {
        id: PipelineEntityId::from_uuid(row.id),
        kind,
        display_name: row.display_name,
        stage,
        organization_id: OrganizationId::from_uuid(row.organization_id),
        active: row.active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

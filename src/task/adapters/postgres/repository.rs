//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{TaskRecord, TaskRow},
    schema::tasks,
};
use crate::pipeline::domain::{PipelineEntityId, Stage, TemplateKey, UserId};
use crate::task::{
    domain::{
        CalendarSyncStatus, PersistedTaskData, StageLink, Task, TaskCategory, TaskId, TaskOrigin,
        TaskPriority, TaskStatus,
    },
    ports::{TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

const GENERATED_UNIQUE_INDEX: &str = "idx_tasks_generated_unique";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
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
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let record = to_record(task);
        let owned = task.clone();

        self.run_blocking(move |connection| {
            diesel::insert_into(tasks::table)
                .values(&record)
                .execute(connection)
                .map_err(|err| map_insert_error(err, &owned))?;
            Ok(())
        })
        .await
    }

    async fn store_generated(&self, batch: &[Task]) -> TaskRepositoryResult<()> {
        let records: Vec<TaskRecord> = batch.iter().map(to_record).collect();
        let owned = batch.to_vec();

        self.run_blocking(move |connection| {
            let outcome = connection.transaction::<_, DieselError, _>(|tx| {
                diesel::insert_into(tasks::table)
                    .values(&records)
                    .execute(tx)
            });
            match outcome {
                Ok(_) => Ok(()),
                Err(err) => {
                    // A multi-row insert does not say which row collided;
                    // report the first generated task of the batch.
                    let first = owned.first().ok_or_else(|| {
                        TaskRepositoryError::persistence(std::io::Error::other(
                            "empty generated batch failed",
                        ))
                    })?;
                    Err(map_insert_error(err, first))
                }
            }
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let record = to_record(task);

        self.run_blocking(move |connection| {
            let affected = diesel::update(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                .set(&record)
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected = diesel::delete(tasks::table.filter(tasks::id.eq(id.into_inner())))
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_by_stage(
        &self,
        entity_id: PipelineEntityId,
        stage: Stage,
    ) -> TaskRepositoryResult<Vec<Task>> {
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::entity_id.eq(entity_id.into_inner()))
                .filter(tasks::stage.eq(stage.as_str()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let owned = query.clone();

        self.run_blocking(move |connection| {
            let mut statement = tasks::table.select(TaskRow::as_select()).into_boxed();

            if let Some(visibility) = owned.visibility() {
                let entity_ids: Vec<uuid::Uuid> = visibility
                    .entity_ids
                    .iter()
                    .map(|entity_id| entity_id.into_inner())
                    .collect();
                statement = statement.filter(
                    tasks::assignee_id
                        .eq(visibility.user_id.into_inner())
                        .or(tasks::entity_id.eq_any(entity_ids)),
                );
            }

            let filter = owned.filter();
            if let Some(assignee) = filter.assignee {
                statement = statement.filter(tasks::assignee_id.eq(assignee.into_inner()));
            }
            if let Some(status) = filter.status {
                statement = statement.filter(tasks::status.eq(status.as_str()));
            }
            if let Some(entity_id) = filter.entity_id {
                statement = statement.filter(tasks::entity_id.eq(entity_id.into_inner()));
            }
            if let Some(stage) = filter.stage {
                statement = statement.filter(tasks::stage.eq(stage.as_str()));
            }

            let rows = statement
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }
}

fn map_insert_error(err: DieselError, task: &Task) -> TaskRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_generated_unique_violation(info.as_ref()) =>
        {
            match (task.link(), task.template_key()) {
                (Some(link), Some(template)) => TaskRepositoryError::DuplicateGeneratedTask {
                    entity_id: link.entity_id,
                    stage: link.stage,
                    template: template.clone(),
                },
                _ => TaskRepositoryError::persistence(err),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TaskRepositoryError::DuplicateTask(task.id())
        }
        _ => TaskRepositoryError::persistence(err),
    }
}

fn is_generated_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == GENERATED_UNIQUE_INDEX)
}

fn to_record(task: &Task) -> TaskRecord {
    let link = task.link();
    TaskRecord {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().map(str::to_owned),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        category: task.category().as_str().to_owned(),
        due_at: task.due_at(),
        assignee_id: task.assignee().map(UserId::into_inner),
        entity_id: link.map(|value| value.entity_id.into_inner()),
        stage: link.map(|value| value.stage.as_str().to_owned()),
        template_key: task.template_key().map(|key| key.as_str().to_owned()),
        blocks_progression: task.blocks_progression(),
        calendar_status: task.calendar_status().as_str().to_owned(),
        calendar_error: task.calendar_error().map(str::to_owned),
        completed_at: task.completed_at(),
        created_by: task.created_by().map(UserId::into_inner),
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        status,
        priority,
        category,
        due_at,
        assignee_id,
        entity_id,
        stage,
        template_key,
        blocks_progression,
        calendar_status,
        calendar_error,
        completed_at,
        created_by,
        created_at,
        updated_at,
    } = row;

    let link = match (entity_id, stage) {
        (Some(entity_id), Some(stage)) => Some(StageLink::new(
            PipelineEntityId::from_uuid(entity_id),
            Stage::try_from(stage.as_str()).map_err(TaskRepositoryError::persistence)?,
        )),
        _ => None,
    };
    let origin = match template_key {
        Some(key) => TaskOrigin::Template {
            key: TemplateKey::new(key).map_err(TaskRepositoryError::persistence)?,
        },
        None => TaskOrigin::Freeform,
    };

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        description,
        status: TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?,
        priority: TaskPriority::try_from(priority.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        category: TaskCategory::try_from(category.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        due_at,
        assignee: assignee_id.map(UserId::from_uuid),
        link,
        origin,
        blocks_progression,
        calendar_status: CalendarSyncStatus::try_from(calendar_status.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        calendar_error,
        completed_at,
        created_by: created_by.map(UserId::from_uuid),
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

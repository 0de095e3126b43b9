//! In-memory repository for tasks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::pipeline::domain::{PipelineEntityId, Stage, TemplateKey};
use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskQuery, TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Enforces the same (entity, stage, template) uniqueness as the
/// `PostgreSQL` index, so generator races behave identically.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

type GeneratedKey = (PipelineEntityId, Stage, TemplateKey);

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    generated_index: HashMap<GeneratedKey, TaskId>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

fn generated_key(task: &Task) -> Option<GeneratedKey> {
    let link = task.link()?;
    let template = task.template_key()?;
    Some((link.entity_id, link.stage, template.clone()))
}

fn duplicate_generated((entity_id, stage, template): GeneratedKey) -> TaskRepositoryError {
    TaskRepositoryError::DuplicateGeneratedTask {
        entity_id,
        stage,
        template,
    }
}

impl InMemoryTaskState {
    fn check_insertable(&self, task: &Task) -> TaskRepositoryResult<()> {
        if self.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        if let Some(key) = generated_key(task) {
            if self.generated_index.contains_key(&key) {
                return Err(duplicate_generated(key));
            }
        }
        Ok(())
    }

    fn insert(&mut self, task: &Task) {
        if let Some(key) = generated_key(task) {
            self.generated_index.insert(key, task.id());
        }
        self.tasks.insert(task.id(), task.clone());
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.check_insertable(task)?;
        state.insert(task);
        Ok(())
    }

    async fn store_generated(&self, tasks: &[Task]) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        // Validate the whole batch before touching state so a collision
        // leaves nothing behind.
        let mut batch_keys = Vec::with_capacity(tasks.len());
        for task in tasks {
            state.check_insertable(task)?;
            if let Some(key) = generated_key(task) {
                if batch_keys.contains(&key) {
                    return Err(duplicate_generated(key));
                }
                batch_keys.push(key);
            }
        }

        for task in tasks {
            state.insert(task);
        }
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let stored = state
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let removed = state
            .tasks
            .remove(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        if let Some(key) = generated_key(&removed) {
            state.generated_index.remove(&key);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_by_stage(
        &self,
        entity_id: PipelineEntityId,
        stage: Stage,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .tasks
            .values()
            .filter(|task| {
                task.link()
                    .is_some_and(|link| link.entity_id == entity_id && link.stage == stage)
            })
            .cloned()
            .collect())
    }

    async fn list(&self, query: &TaskQuery) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .tasks
            .values()
            .filter(|task| query.matches(task))
            .cloned()
            .collect())
    }
}

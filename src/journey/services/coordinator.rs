//! Task lifecycle coordinator: the operations exposed to the admin and
//! portal surfaces.

use super::{
    AuditTrail, CalendarOutcome, CalendarReconciler, CreateFreeformTaskRequest, EntityGuard,
    EntityLocks, JourneyError, JourneyResult, PipelineRegistryService, ProgressionGate,
    TaskGenerator,
};
use crate::config::JourneyConfig;
use crate::journey::{
    domain::{
        AuditAction, AuditEntry, AuditSubject, BlockingTask, Caller, Capability, FieldChange,
        SyncStatusView,
    },
    ports::{AuditSink, CalendarGateway, CapabilityPolicy},
};
use crate::pipeline::{
    domain::{PipelineEntity, PipelineEntityId, Stage, StageCatalogue, UserId},
    ports::PipelineEntityRepository,
};
use crate::task::{
    domain::{
        NewFreeformTask, StageLink, Task, TaskId, TaskPriority, TaskStatus, sort_for_listing,
    },
    ports::{TaskFilter, TaskQuery, TaskRepository},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// External collaborators the engine is wired to.
pub struct JourneyPorts<T, E, G, A> {
    /// Task store.
    pub tasks: Arc<T>,
    /// Pipeline entity store.
    pub entities: Arc<E>,
    /// External calendar.
    pub calendar: Arc<G>,
    /// Append-only audit sink.
    pub audit: Arc<A>,
    /// Capability checks.
    pub policy: Arc<dyn CapabilityPolicy>,
}

/// Entry point for every task and progression operation.
///
/// Each call takes an explicit [`Caller`]; capabilities are checked against
/// the configured policy and portal callers are narrowed to their own tasks
/// before any caller-supplied filter applies. Mutations of entity-linked
/// tasks hold that entity's lock only while storage is written; calendar
/// calls and audit appends happen after it is released.
pub struct TaskCoordinator<T, E, G, A, C>
where
    T: TaskRepository,
    E: PipelineEntityRepository,
    G: CalendarGateway,
    A: AuditSink,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    entities: Arc<E>,
    policy: Arc<dyn CapabilityPolicy>,
    generator: Arc<TaskGenerator<T, E, C>>,
    gate: Arc<ProgressionGate<T, E, A, C>>,
    calendar: CalendarReconciler<G>,
    audit: AuditTrail<A>,
    locks: Arc<EntityLocks>,
    clock: Arc<C>,
}

impl<T, E, G, A, C> TaskCoordinator<T, E, G, A, C>
where
    T: TaskRepository,
    E: PipelineEntityRepository,
    G: CalendarGateway,
    A: AuditSink,
    C: Clock + Send + Sync,
{
    /// Wires the engine from its ports, catalogue and configuration.
    #[must_use]
    pub fn new(
        ports: JourneyPorts<T, E, G, A>,
        catalogue: StageCatalogue,
        config: &JourneyConfig,
        clock: Arc<C>,
    ) -> Self {
        let locks = Arc::new(EntityLocks::new(config.lock_timeout()));
        let generator = Arc::new(TaskGenerator::new(
            Arc::clone(&ports.tasks),
            Arc::clone(&ports.entities),
            Arc::new(catalogue),
            Arc::clone(&locks),
            Arc::clone(&clock),
        ));
        let gate = Arc::new(ProgressionGate::new(
            Arc::clone(&ports.tasks),
            Arc::clone(&ports.entities),
            Arc::clone(&generator),
            Arc::clone(&ports.audit),
            Arc::clone(&locks),
            Arc::clone(&clock),
        ));
        Self {
            tasks: ports.tasks,
            entities: ports.entities,
            policy: ports.policy,
            generator,
            gate,
            calendar: CalendarReconciler::new(ports.calendar, config.calendar_timeout()),
            audit: AuditTrail::new(ports.audit),
            locks,
            clock,
        }
    }

    /// Returns the auto-task generator.
    #[must_use]
    pub const fn generator(&self) -> &Arc<TaskGenerator<T, E, C>> {
        &self.generator
    }

    /// Returns the progression gate.
    #[must_use]
    pub const fn gate(&self) -> &Arc<ProgressionGate<T, E, A, C>> {
        &self.gate
    }

    /// Returns a registry service sharing this coordinator's lock table.
    #[must_use]
    pub fn registry(&self) -> PipelineRegistryService<T, E, A, C> {
        PipelineRegistryService::new(
            Arc::clone(&self.entities),
            Arc::clone(&self.generator),
            Arc::clone(self.audit.sink()),
            Arc::clone(&self.locks),
            Arc::clone(&self.clock),
        )
    }

    /// Lists the tasks visible to `caller` that match `filter`, in listing
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::Forbidden`] without the read capability and
    /// repository errors.
    pub async fn list_tasks(&self, caller: &Caller, filter: TaskFilter) -> JourneyResult<Vec<Task>> {
        self.authorize(caller, Capability::ReadTasks)?;
        let query = TaskQuery::new(filter).scoped(caller.visibility());
        let mut tasks = self.tasks.list(&query).await?;
        sort_for_listing(&mut tasks);
        Ok(tasks)
    }

    /// Reads one task.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::TaskNotFound`] when the task does not exist
    /// or is outside the caller's visibility.
    pub async fn get_task(&self, caller: &Caller, task_id: TaskId) -> JourneyResult<Task> {
        self.authorize(caller, Capability::ReadTasks)?;
        self.load_visible(caller, task_id).await
    }

    /// Creates a user-authored task.
    ///
    /// A linked task joins the entity's current stage.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::Forbidden`] without the create capability or
    /// when linking to an entity the caller does not own,
    /// [`JourneyError::Task`] for a blank title, entity lookup errors and
    /// repository errors.
    #[instrument(skip(self, caller, request), fields(actor = %caller.actor()))]
    pub async fn create_freeform(
        &self,
        caller: &Caller,
        request: CreateFreeformTaskRequest,
    ) -> JourneyResult<Task> {
        self.authorize(caller, Capability::CreateTask)?;
        let CreateFreeformTaskRequest {
            title,
            description,
            priority,
            category,
            due_at,
            assignee,
            entity_id,
            blocks_progression,
        } = request;

        let locked = match entity_id {
            Some(entity_id) => {
                if !caller.owns_entity(entity_id) {
                    return Err(JourneyError::Forbidden(Capability::CreateTask));
                }
                let guard = self.locks.acquire(entity_id).await?;
                let entity = self.active_entity(entity_id).await?;
                Some((guard, StageLink::new(entity_id, entity.stage())))
            }
            None => None,
        };
        let link = locked.as_ref().map(|(_, link)| *link);

        let task = Task::new_freeform(
            NewFreeformTask {
                title,
                description,
                priority,
                category,
                due_at,
                assignee,
                link,
                blocks_progression,
                created_by: caller.actor(),
            },
            &*self.clock,
        )?;
        self.tasks.store(&task).await?;
        if task.blocks_progression() {
            self.invalidate_gate(&task);
        }
        drop(locked);

        debug!(task_id = %task.id(), "freeform task created");
        self.audit_task(task.id(), AuditAction::Created, creation_changes(&task), caller)
            .await;
        Ok(task)
    }

    /// Sets a task's status.
    ///
    /// Entering `done` stamps the completion time; leaving it clears it.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::Forbidden`], [`JourneyError::TaskNotFound`],
    /// the transient [`JourneyError::EntityBusy`] and repository errors.
    #[instrument(skip(self, caller), fields(actor = %caller.actor()))]
    pub async fn update_status(
        &self,
        caller: &Caller,
        task_id: TaskId,
        status: TaskStatus,
    ) -> JourneyResult<Task> {
        let (task, _) = self
            .mutate(caller, task_id, Capability::UpdateStatus, move |task, clock| {
                let old = task.status();
                task.set_status(status, clock);
                changed("status", Some(old), Some(task.status()))
            })
            .await?;
        Ok(task)
    }

    /// Sets a task's priority.
    ///
    /// # Errors
    ///
    /// As [`Self::update_status`], checked against the edit capability.
    pub async fn update_priority(
        &self,
        caller: &Caller,
        task_id: TaskId,
        priority: TaskPriority,
    ) -> JourneyResult<Task> {
        let (task, _) = self
            .mutate(caller, task_id, Capability::EditTask, move |task, clock| {
                let old = task.priority();
                task.set_priority(priority, clock);
                changed("priority", Some(old), Some(task.priority()))
            })
            .await?;
        Ok(task)
    }

    /// Sets or clears a task's assignee.
    ///
    /// # Errors
    ///
    /// As [`Self::update_status`], checked against the edit capability.
    pub async fn assign(
        &self,
        caller: &Caller,
        task_id: TaskId,
        assignee: Option<UserId>,
    ) -> JourneyResult<Task> {
        let (task, _) = self
            .mutate(caller, task_id, Capability::EditTask, move |task, clock| {
                let old = task.assignee();
                task.assign(assignee, clock);
                changed("assignee", old, task.assignee())
            })
            .await?;
        Ok(task)
    }

    /// Sets or clears a task's due date.
    ///
    /// A mirrored task has its external event refreshed, or removed when
    /// the due date is cleared.
    ///
    /// # Errors
    ///
    /// As [`Self::update_status`], checked against the edit capability.
    /// Calendar failures are recorded on the task, never returned.
    pub async fn reschedule(
        &self,
        caller: &Caller,
        task_id: TaskId,
        due_at: Option<DateTime<Utc>>,
    ) -> JourneyResult<Task> {
        let (task, rescheduled) = self
            .mutate(caller, task_id, Capability::EditTask, move |task, clock| {
                let old = task.due_at();
                task.reschedule(due_at, clock);
                changed("due_at", old, task.due_at())
            })
            .await?;
        if !rescheduled || !task.is_synced() {
            return Ok(task);
        }

        let outcome = if task.can_sync() {
            self.calendar.push(&task).await
        } else {
            // An unscheduled task cannot stay mirrored whatever the calendar
            // answers.
            self.calendar.remove(task.id()).await;
            CalendarOutcome::Unsynced
        };
        self.record_calendar(caller, &task, outcome).await
    }

    /// Deletes a task, then requests removal of its external event when it
    /// was mirrored.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::Forbidden`], [`JourneyError::TaskNotFound`],
    /// the transient [`JourneyError::EntityBusy`] and repository errors.
    /// Calendar failures are logged only.
    #[instrument(skip(self, caller), fields(actor = %caller.actor()))]
    pub async fn delete_task(&self, caller: &Caller, task_id: TaskId) -> JourneyResult<()> {
        self.authorize(caller, Capability::DeleteTask)?;
        let visible = self.load_visible(caller, task_id).await?;

        let guard = self.lock_entity(visible.entity_id()).await?;
        let task = self.reload(task_id).await?;
        self.tasks.delete(task_id).await?;
        if task.blocks_progression() {
            self.invalidate_gate(&task);
        }
        drop(guard);

        if task.is_synced() {
            self.calendar.remove(task_id).await;
        }
        info!(%task_id, "task deleted");
        self.audit_task(
            task_id,
            AuditAction::Deleted,
            vec![FieldChange::new("title", Some(task.title().to_owned()), None)],
            caller,
        )
        .await;
        Ok(())
    }

    /// Reports whether the entity may leave its current stage.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::Forbidden`] without the inspect capability,
    /// [`JourneyError::EntityNotFound`] for unknown entities or entities
    /// the caller does not own, and repository errors.
    pub async fn can_advance(
        &self,
        caller: &Caller,
        entity_id: PipelineEntityId,
    ) -> JourneyResult<bool> {
        self.authorize_entity(caller, Capability::InspectProgress, entity_id)?;
        self.gate.can_advance(entity_id).await
    }

    /// Lists the tasks holding the entity at its current stage.
    ///
    /// # Errors
    ///
    /// As [`Self::can_advance`].
    pub async fn blocking_tasks(
        &self,
        caller: &Caller,
        entity_id: PipelineEntityId,
    ) -> JourneyResult<Vec<BlockingTask>> {
        self.authorize_entity(caller, Capability::InspectProgress, entity_id)?;
        self.gate.blocking_tasks(entity_id).await
    }

    /// Advances the entity to its next stage and materializes that stage's
    /// tasks.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::Forbidden`] without the advance capability
    /// and everything [`ProgressionGate::advance`] returns.
    pub async fn advance(
        &self,
        caller: &Caller,
        entity_id: PipelineEntityId,
    ) -> JourneyResult<Stage> {
        self.authorize_entity(caller, Capability::AdvanceStage, entity_id)?;
        self.gate.advance(entity_id, Some(caller.actor())).await
    }

    /// Materializes the templates of `stage` for the entity; used when an
    /// entity's stage changes.
    ///
    /// # Errors
    ///
    /// As [`TaskGenerator::ensure_tasks_for_stage`].
    pub async fn ensure_tasks_for_stage(
        &self,
        entity_id: PipelineEntityId,
        stage: Stage,
    ) -> JourneyResult<usize> {
        self.generator.ensure_tasks_for_stage(entity_id, stage).await
    }

    /// Flips calendar mirroring for a task and reports the resulting state.
    ///
    /// Tasks without a due date report `can_sync = false` and nothing is
    /// called or changed.
    ///
    /// # Errors
    ///
    /// Returns [`JourneyError::Forbidden`], [`JourneyError::TaskNotFound`]
    /// and repository errors. Calendar failures are recorded on the task.
    #[instrument(skip(self, caller), fields(actor = %caller.actor()))]
    pub async fn toggle_sync(
        &self,
        caller: &Caller,
        task_id: TaskId,
    ) -> JourneyResult<SyncStatusView> {
        self.authorize(caller, Capability::ToggleCalendarSync)?;
        let task = self.load_visible(caller, task_id).await?;
        let Some(outcome) = self.calendar.toggle(&task).await else {
            return Ok(CalendarReconciler::<G>::sync_status(&task));
        };
        let updated = self.record_calendar(caller, &task, outcome).await?;
        Ok(CalendarReconciler::<G>::sync_status(&updated))
    }

    /// Reports a task's calendar state.
    ///
    /// # Errors
    ///
    /// As [`Self::get_task`].
    pub async fn sync_status(
        &self,
        caller: &Caller,
        task_id: TaskId,
    ) -> JourneyResult<SyncStatusView> {
        let task = self.get_task(caller, task_id).await?;
        Ok(CalendarReconciler::<G>::sync_status(&task))
    }

    fn authorize(&self, caller: &Caller, capability: Capability) -> JourneyResult<()> {
        if self.policy.permits(caller, capability) {
            Ok(())
        } else {
            debug!(actor = %caller.actor(), ?capability, "capability denied");
            Err(JourneyError::Forbidden(capability))
        }
    }

    fn authorize_entity(
        &self,
        caller: &Caller,
        capability: Capability,
        entity_id: PipelineEntityId,
    ) -> JourneyResult<()> {
        self.authorize(caller, capability)?;
        if caller.owns_entity(entity_id) {
            Ok(())
        } else {
            Err(JourneyError::EntityNotFound(entity_id))
        }
    }

    async fn load_visible(&self, caller: &Caller, task_id: TaskId) -> JourneyResult<Task> {
        let task = self.reload(task_id).await?;
        match caller.visibility() {
            Some(scope) if !scope.permits(&task) => Err(JourneyError::TaskNotFound(task_id)),
            _ => Ok(task),
        }
    }

    async fn reload(&self, task_id: TaskId) -> JourneyResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(JourneyError::TaskNotFound(task_id))
    }

    async fn active_entity(&self, entity_id: PipelineEntityId) -> JourneyResult<PipelineEntity> {
        let entity = self
            .entities
            .find_by_id(entity_id)
            .await?
            .ok_or(JourneyError::EntityNotFound(entity_id))?;
        if entity.is_active() {
            Ok(entity)
        } else {
            Err(JourneyError::EntityInactive(entity_id))
        }
    }

    async fn lock_entity(
        &self,
        entity_id: Option<PipelineEntityId>,
    ) -> JourneyResult<Option<EntityGuard>> {
        match entity_id {
            Some(entity_id) => Ok(Some(self.locks.acquire(entity_id).await?)),
            None => Ok(None),
        }
    }

    fn invalidate_gate(&self, task: &Task) {
        if let Some(entity_id) = task.entity_id() {
            self.gate.invalidate(entity_id);
        }
    }

    /// Checks access, then applies `apply` to a fresh copy of the task
    /// under its entity lock and audits the resulting changes.
    ///
    /// Returns the task and whether anything changed.
    async fn mutate<F>(
        &self,
        caller: &Caller,
        task_id: TaskId,
        capability: Capability,
        apply: F,
    ) -> JourneyResult<(Task, bool)>
    where
        F: FnOnce(&mut Task, &C) -> Vec<FieldChange> + Send,
    {
        self.authorize(caller, capability)?;
        let visible = self.load_visible(caller, task_id).await?;
        let (task, changes) = self.commit(task_id, visible.entity_id(), apply).await?;
        let changed = !changes.is_empty();
        if changed {
            self.audit_task(task_id, AuditAction::Updated, changes, caller)
                .await;
        }
        Ok((task, changed))
    }

    async fn commit<F>(
        &self,
        task_id: TaskId,
        entity_id: Option<PipelineEntityId>,
        apply: F,
    ) -> JourneyResult<(Task, Vec<FieldChange>)>
    where
        F: FnOnce(&mut Task, &C) -> Vec<FieldChange> + Send,
    {
        let _guard = self.lock_entity(entity_id).await?;
        let mut task = self.reload(task_id).await?;
        let changes = apply(&mut task, &*self.clock);
        if changes.is_empty() {
            return Ok((task, changes));
        }
        self.tasks.update(&task).await?;
        if task.blocks_progression() {
            self.invalidate_gate(&task);
        }
        Ok((task, changes))
    }

    async fn record_calendar(
        &self,
        caller: &Caller,
        task: &Task,
        outcome: CalendarOutcome,
    ) -> JourneyResult<Task> {
        let (updated, changes) = self
            .commit(task.id(), task.entity_id(), move |stored, clock| {
                let old_status = stored.calendar_status().as_str();
                let old_error = stored.calendar_error().map(str::to_owned);
                outcome.apply(stored, clock);
                let mut recorded = changed(
                    "calendar_status",
                    Some(old_status),
                    Some(stored.calendar_status().as_str()),
                );
                recorded.extend(changed(
                    "calendar_error",
                    old_error.as_deref(),
                    stored.calendar_error(),
                ));
                recorded
            })
            .await?;
        if !changes.is_empty() {
            self.audit_task(updated.id(), AuditAction::Updated, changes, caller)
                .await;
        }
        Ok(updated)
    }

    async fn audit_task(
        &self,
        task_id: TaskId,
        action: AuditAction,
        changes: Vec<FieldChange>,
        caller: &Caller,
    ) {
        self.audit
            .record(AuditEntry::new(
                AuditSubject::Task(task_id),
                action,
                changes,
                Some(caller.actor()),
                &*self.clock,
            ))
            .await;
    }
}

fn changed<V: PartialEq + Display>(field: &str, old: Option<V>, new: Option<V>) -> Vec<FieldChange> {
    if old == new {
        return Vec::new();
    }
    vec![FieldChange::new(
        field,
        old.map(|value| value.to_string()),
        new.map(|value| value.to_string()),
    )]
}

fn creation_changes(task: &Task) -> Vec<FieldChange> {
    let mut changes = vec![
        FieldChange::set("title", task.title()),
        FieldChange::set("status", task.status().to_string()),
        FieldChange::set("priority", task.priority().to_string()),
        FieldChange::set("category", task.category().as_str()),
        FieldChange::set("blocks_progression", task.blocks_progression().to_string()),
    ];
    changes.extend(changed("description", None, task.description()));
    changes.extend(changed("due_at", None, task.due_at()));
    changes.extend(changed("assignee", None, task.assignee()));
    if let Some(link) = task.link() {
        changes.push(FieldChange::set("entity_id", link.entity_id.to_string()));
        changes.push(FieldChange::set("stage", link.stage.as_str()));
    }
    changes
}

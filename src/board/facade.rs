//! Board facade wiring the state machine to the automation engine.

use crate::automation::{
    ports::{AutomationRepository, BadgeLedger},
    services::{AutomationEngine, CascadeReport},
};
use crate::error::ErrorKind;
use crate::event::Causation;
use crate::project::{
    domain::{ProjectId, UserId},
    ports::ProjectRepository,
};
use crate::task::{
    domain::{Actor, Task, TaskFieldChanges, TaskId},
    ports::TaskRepository,
    services::{CreateTaskRequest, MoveTaskRequest, TaskCommit, TaskService, TaskServiceError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors returned by board operations.
///
/// Only the initiating operation can fail; automation failures are
/// reported in the [`CascadeReport`].
#[derive(Debug, Error)]
pub enum BoardError {
    /// The task state machine rejected the operation.
    #[error(transparent)]
    Task(#[from] TaskServiceError),
}

impl BoardError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Task(err) => err.kind(),
        }
    }
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// A task after its operation and the resulting cascade completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledTask {
    task: Task,
    cascade: CascadeReport,
}

impl SettledTask {
    /// Returns the task as re-read after the cascade.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns what the automations did.
    #[must_use]
    pub const fn cascade(&self) -> &CascadeReport {
        &self.cascade
    }

    /// Consumes the result, returning the task.
    #[must_use]
    pub fn into_task(self) -> Task {
        self.task
    }
}

/// Tasks reported overdue by a sweep and the cascade they caused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueSweep {
    tasks: Vec<Task>,
    cascade: CascadeReport,
}

impl OverdueSweep {
    /// Returns the tasks newly marked overdue, as committed by the sweep.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Returns what the automations did.
    #[must_use]
    pub const fn cascade(&self) -> &CascadeReport {
        &self.cascade
    }
}

/// Facade over the task state machine and the automation engine.
pub struct Board<T, P, A, B, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    A: AutomationRepository,
    B: BadgeLedger,
    C: Clock + Send + Sync,
{
    tasks: Arc<TaskService<T, P, C>>,
    engine: AutomationEngine<T, P, A, B, C>,
}

impl<T, P, A, B, C> Board<T, P, A, B, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    A: AutomationRepository,
    B: BadgeLedger,
    C: Clock + Send + Sync,
{
    /// Creates a board from a task service and the engine reacting to it.
    #[must_use]
    pub const fn new(
        tasks: Arc<TaskService<T, P, C>>,
        engine: AutomationEngine<T, P, A, B, C>,
    ) -> Self {
        Self { tasks, engine }
    }

    /// Returns the underlying task state machine.
    #[must_use]
    pub const fn tasks(&self) -> &Arc<TaskService<T, P, C>> {
        &self.tasks
    }

    /// Creates a task and runs `taskCreated` automations.
    ///
    /// # Errors
    ///
    /// Returns the validation and lookup errors of
    /// [`TaskService::create_task`].
    pub async fn create_task(
        &self,
        user: UserId,
        request: CreateTaskRequest,
    ) -> BoardResult<SettledTask> {
        let commit = self.tasks.create_task(user, request).await?;
        Ok(self.settle(commit, Actor::User(user)).await)
    }

    /// Moves a task and runs `taskMoved` automations.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`TaskService::transition_status`].
    pub async fn move_task(
        &self,
        user: UserId,
        request: &MoveTaskRequest,
    ) -> BoardResult<SettledTask> {
        let causation = Causation::user(user);
        let commit = self
            .tasks
            .transition_status(request.task_id, &request.new_status, &causation)
            .await?;
        Ok(self.settle(commit, Actor::User(user)).await)
    }

    /// Reassigns a task and runs `taskAssigned` automations.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`TaskService::reassign`].
    pub async fn reassign_task(
        &self,
        user: UserId,
        task_id: TaskId,
        assignee: Option<UserId>,
    ) -> BoardResult<SettledTask> {
        let causation = Causation::user(user);
        let commit = self.tasks.reassign(task_id, assignee, &causation).await?;
        Ok(self.settle(commit, Actor::User(user)).await)
    }

    /// Edits task fields.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`TaskService::update_fields`].
    pub async fn update_task(
        &self,
        user: UserId,
        task_id: TaskId,
        changes: &TaskFieldChanges,
    ) -> BoardResult<SettledTask> {
        let causation = Causation::user(user);
        let commit = self.tasks.update_fields(task_id, changes, &causation).await?;
        Ok(self.settle(commit, Actor::User(user)).await)
    }

    /// Comments on a task.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`TaskService::add_comment`].
    pub async fn add_comment(
        &self,
        user: UserId,
        task_id: TaskId,
        text: &str,
    ) -> BoardResult<SettledTask> {
        let commit = self.tasks.add_comment(user, task_id, text).await?;
        Ok(self.settle(commit, Actor::User(user)).await)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`TaskService::delete_task`].
    pub async fn delete_task(&self, user: UserId, task_id: TaskId) -> BoardResult<()> {
        self.tasks.delete_task(user, task_id).await?;
        Ok(())
    }

    /// Reports every newly overdue task of the project and runs
    /// `dueDatePassed` automations for each.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`TaskService::mark_overdue`].
    pub async fn sweep_overdue(&self, project_id: ProjectId) -> BoardResult<OverdueSweep> {
        let commits = self.tasks.mark_overdue(project_id).await?;
        let (tasks, events): (Vec<Task>, Vec<_>) =
            commits.into_iter().map(TaskCommit::into_parts).unzip();
        let cascade = self.engine.run(events.into_iter().flatten()).await;
        debug!(
            project_id = %project_id,
            overdue = tasks.len(),
            executions = cascade.executions().len(),
            "overdue sweep settled"
        );
        Ok(OverdueSweep { tasks, cascade })
    }

    /// Runs the cascade for a committed change and re-reads the task.
    ///
    /// The change is already committed and broadcast at this point, so a
    /// failed re-read (the task was deleted, or the caller lost access
    /// during the cascade) falls back to the committed task.
    async fn settle(&self, commit: TaskCommit, actor: Actor) -> SettledTask {
        let (committed, event) = commit.into_parts();
        let cascade = self.engine.run(event).await;
        let task_id = committed.id();
        let task = self
            .tasks
            .find_task(task_id, actor)
            .await
            .unwrap_or_else(|err| {
                warn!(
                    task_id = %task_id,
                    error = %err,
                    "task unavailable after cascade; returning committed state"
                );
                committed
            });
        SettledTask { task, cascade }
    }
}

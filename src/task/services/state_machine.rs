//! Task state machine: validated creation, transitions, and edits.
//!
//! Every mutating operation runs under the owning project's write lock,
//! re-reads the project's status registry at commit time, and publishes its
//! domain event before releasing the lock so that observers see events in
//! commit order. Task writes are additionally guarded by optimistic
//! versioning against writers outside this process.

use super::requests::{CreateTaskParts, CreateTaskRequest, TaskCommit};
use crate::concurrency::ProjectWriteLocks;
use crate::config::EngineConfig;
use crate::error::ErrorKind;
use crate::event::{Causation, DomainChange, DomainEvent};
use crate::project::{
    domain::{Project, ProjectId, StatusName, UserId},
    ports::{ProjectRepository, ProjectRepositoryError},
};
use crate::realtime::ports::EventDispatcher;
use crate::task::{
    domain::{Actor, NewTask, Task, TaskDomainError, TaskFieldChanges, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Service-level errors for task state machine operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Task repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// Project repository operation failed.
    #[error(transparent)]
    ProjectRepository(#[from] ProjectRepositoryError),

    /// The project does not exist or the caller is not a member.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The task does not exist or the caller is not a member of its project.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The status is not in the project's registry.
    #[error("invalid status '{status}' for project {project_id}")]
    InvalidStatus {
        /// Project whose registry was consulted.
        project_id: ProjectId,
        /// Requested status.
        status: String,
    },

    /// The assignee is not a member of the project.
    #[error("assignee {0} is not a member of the project")]
    AssigneeNotMember(UserId),

    /// The actor lacks the role required for the operation.
    #[error("{actor} is not permitted to {operation} this task")]
    NotPermitted {
        /// Acting party.
        actor: Actor,
        /// Refused operation.
        operation: &'static str,
    },

    /// Optimistic concurrency retries were exhausted.
    #[error("task {0} was modified concurrently, retries exhausted")]
    ConcurrencyConflict(TaskId),
}

impl TaskServiceError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::InvalidStatus { .. } | Self::AssigneeNotMember(_) => {
                ErrorKind::Validation
            }
            Self::NotPermitted { .. } => ErrorKind::Authorization,
            Self::ProjectNotFound(_)
            | Self::TaskNotFound(_)
            | Self::Repository(TaskRepositoryError::NotFound(_))
            | Self::ProjectRepository(ProjectRepositoryError::NotFound(_)) => ErrorKind::NotFound,
            Self::ConcurrencyConflict(_)
            | Self::Repository(TaskRepositoryError::VersionConflict { .. }) => {
                ErrorKind::ConcurrencyConflict
            }
            Self::Repository(_) | Self::ProjectRepository(_) => ErrorKind::Persistence,
        }
    }
}

/// Result type for task state machine operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

enum CommitAttempt {
    Committed,
    Retry,
}

const fn next_order(max_order: Option<i64>) -> i64 {
    match max_order {
        Some(max) => max.saturating_add(1),
        None => 0,
    }
}

/// Task state machine service.
#[derive(Clone)]
pub struct TaskService<T, P, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    projects: Arc<P>,
    dispatcher: Arc<dyn EventDispatcher>,
    locks: Arc<ProjectWriteLocks>,
    config: EngineConfig,
    clock: Arc<C>,
}

impl<T, P, C> TaskService<T, P, C>
where
    T: TaskRepository,
    P: ProjectRepository,
    C: Clock + Send + Sync,
{
    /// Creates a task service with the default engine configuration.
    #[must_use]
    pub fn new(
        tasks: Arc<T>,
        projects: Arc<P>,
        dispatcher: Arc<dyn EventDispatcher>,
        locks: Arc<ProjectWriteLocks>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            projects,
            dispatcher,
            locks,
            config: EngineConfig::default(),
            clock,
        }
    }

    /// Replaces the engine configuration.
    #[must_use]
    pub const fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a task in the project's first column or the requested one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectNotFound`] for non-members,
    /// [`TaskServiceError::InvalidStatus`] for a status outside the registry,
    /// [`TaskServiceError::AssigneeNotMember`] for a non-member assignee, and
    /// [`TaskServiceError::Domain`] for a blank title.
    pub async fn create_task(
        &self,
        creator: UserId,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<TaskCommit> {
        let CreateTaskParts {
            project_id,
            title,
            description,
            status,
            assignee,
            priority,
            due_date,
        } = request.into_parts();
        let causation = Causation::user(creator);
        let _guard = self.locks.acquire(project_id).await;

        let project = self.load_project(project_id, causation.actor()).await?;
        let initial_status = match status {
            Some(raw) => resolve_status(&project, &raw)?,
            None => project.statuses().initial().cloned().ok_or_else(|| {
                TaskServiceError::InvalidStatus {
                    project_id,
                    status: String::new(),
                }
            })?,
        };
        if let Some(requested) = assignee {
            ensure_assignable(&project, requested)?;
        }

        let order = next_order(self.tasks.max_order(project_id, &initial_status, None).await?);
        let task = Task::new(
            NewTask {
                project_id,
                title,
                description,
                status: initial_status,
                assignee,
                creator,
                priority,
                due_date,
            },
            order,
            causation.actor(),
            &*self.clock,
        )?;
        self.tasks.store(&task).await?;

        info!(
            task_id = %task.id(),
            project_id = %project_id,
            status = %task.status(),
            order,
            "task created"
        );
        let event = self.publish(
            project_id,
            DomainChange::TaskCreated { task: task.clone() },
            causation,
        );
        Ok(TaskCommit::new(task, Some(event)))
    }

    /// Moves a task into a status column, placing it after every other task
    /// already there. Moving into the current status re-places the task at
    /// the end of its column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::InvalidStatus`] when the status is not in
    /// the project's registry at commit time,
    /// [`TaskServiceError::TaskNotFound`] for missing tasks or non-member
    /// users, and [`TaskServiceError::ConcurrencyConflict`] when version
    /// retries are exhausted.
    pub async fn transition_status(
        &self,
        task_id: TaskId,
        new_status: &str,
        causation: &Causation,
    ) -> TaskServiceResult<TaskCommit> {
        let actor = causation.actor();
        let project_id = self.locate(task_id).await?;
        let _guard = self.locks.acquire(project_id).await;

        let mut attempt = 0;
        loop {
            let (mut task, project) = self.load_task(task_id, actor).await?;
            let status = resolve_status(&project, new_status)?;
            let order = next_order(
                self.tasks
                    .max_order(project_id, &status, Some(task_id))
                    .await?,
            );
            let expected = task.version();
            let from_status = task.move_to(status, order, actor, &*self.clock);
            let result = self.tasks.update(&task, expected).await;
            if let CommitAttempt::Retry = self.settle(task_id, &mut attempt, result)? {
                continue;
            }

            info!(
                task_id = %task_id,
                project_id = %project_id,
                from = %from_status,
                to = %task.status(),
                order,
                actor = %actor,
                "task moved"
            );
            let to_status = task.status().clone();
            let event = self.publish(
                project_id,
                DomainChange::TaskMoved {
                    task: task.clone(),
                    from_status,
                    to_status,
                },
                causation.clone(),
            );
            return Ok(TaskCommit::new(task, Some(event)));
        }
    }

    /// Replaces the assignee. Reassigning to the current assignee commits
    /// nothing and publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::AssigneeNotMember`] when the new assignee
    /// is not a project member, plus the lookup and concurrency errors of
    /// [`Self::transition_status`].
    pub async fn reassign(
        &self,
        task_id: TaskId,
        assignee: Option<UserId>,
        causation: &Causation,
    ) -> TaskServiceResult<TaskCommit> {
        let actor = causation.actor();
        let project_id = self.locate(task_id).await?;
        let _guard = self.locks.acquire(project_id).await;

        let mut attempt = 0;
        loop {
            let (mut task, project) = self.load_task(task_id, actor).await?;
            if let Some(new_assignee) = assignee {
                ensure_assignable(&project, new_assignee)?;
            }
            let expected = task.version();
            let previous_assignee = task.assignee();
            if !task.reassign(assignee, actor, &*self.clock) {
                debug!(task_id = %task_id, "assignee unchanged");
                return Ok(TaskCommit::new(task, None));
            }
            let result = self.tasks.update(&task, expected).await;
            if let CommitAttempt::Retry = self.settle(task_id, &mut attempt, result)? {
                continue;
            }

            info!(task_id = %task_id, project_id = %project_id, actor = %actor, "task reassigned");
            let event = self.publish(
                project_id,
                DomainChange::TaskAssigned {
                    task: task.clone(),
                    previous_assignee,
                    new_assignee: assignee,
                },
                causation.clone(),
            );
            return Ok(TaskCommit::new(task, Some(event)));
        }
    }

    /// Edits title, description, priority, or due date.
    ///
    /// Commits and publishes nothing when no field actually changes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] for a blank title, plus the
    /// lookup and concurrency errors of [`Self::transition_status`].
    pub async fn update_fields(
        &self,
        task_id: TaskId,
        changes: &TaskFieldChanges,
        causation: &Causation,
    ) -> TaskServiceResult<TaskCommit> {
        let actor = causation.actor();
        let project_id = self.locate(task_id).await?;
        let _guard = self.locks.acquire(project_id).await;

        let mut attempt = 0;
        loop {
            let (mut task, _project) = self.load_task(task_id, actor).await?;
            let expected = task.version();
            let applied = task.apply_changes(changes.clone(), actor, &*self.clock)?;
            if applied.is_empty() {
                return Ok(TaskCommit::new(task, None));
            }
            let result = self.tasks.update(&task, expected).await;
            if let CommitAttempt::Retry = self.settle(task_id, &mut attempt, result)? {
                continue;
            }

            info!(
                task_id = %task_id,
                project_id = %project_id,
                changed = applied.len(),
                "task fields updated"
            );
            let event = self.publish(
                project_id,
                DomainChange::TaskUpdated { task: task.clone() },
                causation.clone(),
            );
            return Ok(TaskCommit::new(task, Some(event)));
        }
    }

    /// Adds a comment to a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] for blank text, plus the lookup
    /// and concurrency errors of [`Self::transition_status`].
    pub async fn add_comment(
        &self,
        author: UserId,
        task_id: TaskId,
        text: &str,
    ) -> TaskServiceResult<TaskCommit> {
        let causation = Causation::user(author);
        let project_id = self.locate(task_id).await?;
        let _guard = self.locks.acquire(project_id).await;

        let mut attempt = 0;
        loop {
            let (mut task, _project) = self.load_task(task_id, causation.actor()).await?;
            let expected = task.version();
            let comment = task.add_comment(author, text, &*self.clock)?;
            let result = self.tasks.update(&task, expected).await;
            if let CommitAttempt::Retry = self.settle(task_id, &mut attempt, result)? {
                continue;
            }

            debug!(task_id = %task_id, comment_id = %comment.id(), "comment added");
            let event = self.publish(
                project_id,
                DomainChange::CommentAdded {
                    task: task.clone(),
                    comment,
                },
                causation,
            );
            return Ok(TaskCommit::new(task, Some(event)));
        }
    }

    /// Deletes a task. Only the project owner and the task's creator may
    /// delete it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotPermitted`] for other members and
    /// [`TaskServiceError::TaskNotFound`] for missing tasks or non-members.
    pub async fn delete_task(&self, user: UserId, task_id: TaskId) -> TaskServiceResult<DomainEvent> {
        let causation = Causation::user(user);
        let project_id = self.locate(task_id).await?;
        let _guard = self.locks.acquire(project_id).await;

        let (task, project) = self.load_task(task_id, causation.actor()).await?;
        if project.owner() != user && task.creator() != user {
            return Err(TaskServiceError::NotPermitted {
                actor: causation.actor(),
                operation: "delete",
            });
        }
        self.tasks.delete(task_id).await?;

        info!(task_id = %task_id, project_id = %project_id, "task deleted");
        Ok(self.publish(project_id, DomainChange::TaskDeleted { task_id }, causation))
    }

    /// Emits one due-date-passed event for every task of the project whose
    /// due date has elapsed and that has not been reported yet.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectNotFound`] when the project does
    /// not exist, and repository or concurrency errors from the sweep.
    pub async fn mark_overdue(&self, project_id: ProjectId) -> TaskServiceResult<Vec<TaskCommit>> {
        let causation = Causation::system();
        let _guard = self.locks.acquire(project_id).await;
        self.load_project(project_id, causation.actor()).await?;

        let now = self.clock.utc();
        let candidates: Vec<TaskId> = self
            .tasks
            .list_by_project(project_id)
            .await?
            .into_iter()
            .filter(|task| task.is_due_for_overdue(now))
            .map(|task| task.id())
            .collect();

        let mut commits = Vec::with_capacity(candidates.len());
        for task_id in candidates {
            let mut attempt = 0;
            loop {
                let Some(mut task) = self.tasks.find_by_id(task_id).await? else {
                    break;
                };
                let expected = task.version();
                if !task.mark_overdue(&*self.clock) {
                    break;
                }
                let result = self.tasks.update(&task, expected).await;
                if let CommitAttempt::Retry = self.settle(task_id, &mut attempt, result)? {
                    continue;
                }

                info!(task_id = %task_id, project_id = %project_id, "task due date passed");
                let event = self.publish(
                    project_id,
                    DomainChange::DueDatePassed { task: task.clone() },
                    causation.clone(),
                );
                commits.push(TaskCommit::new(task, Some(event)));
                break;
            }
        }
        Ok(commits)
    }

    /// Returns a task visible to the actor.
    ///
    /// Automations and the scheduler see every task; users see tasks of
    /// projects they belong to.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::TaskNotFound`] for missing tasks or
    /// non-member users.
    pub async fn find_task(&self, task_id: TaskId, actor: Actor) -> TaskServiceResult<Task> {
        let (task, _project) = self.load_task(task_id, actor).await?;
        Ok(task)
    }

    /// Returns every task of a project, by column order then newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::ProjectNotFound`] for missing projects or
    /// non-member users.
    pub async fn list_tasks(
        &self,
        user: UserId,
        project_id: ProjectId,
    ) -> TaskServiceResult<Vec<Task>> {
        self.load_project(project_id, Actor::User(user)).await?;
        Ok(self.tasks.list_by_project(project_id).await?)
    }

    async fn locate(&self, task_id: TaskId) -> TaskServiceResult<ProjectId> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .map(|task| task.project_id())
            .ok_or(TaskServiceError::TaskNotFound(task_id))
    }

    async fn load_project(&self, project_id: ProjectId, actor: Actor) -> TaskServiceResult<Project> {
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or(TaskServiceError::ProjectNotFound(project_id))?;
        if let Actor::User(user) = actor
            && !project.is_member(user)
        {
            return Err(TaskServiceError::ProjectNotFound(project_id));
        }
        Ok(project)
    }

    async fn load_task(&self, task_id: TaskId, actor: Actor) -> TaskServiceResult<(Task, Project)> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(task_id))?;
        let project = self
            .load_project(task.project_id(), actor)
            .await
            .map_err(|err| match err {
                TaskServiceError::ProjectNotFound(_) => TaskServiceError::TaskNotFound(task_id),
                other => other,
            })?;
        Ok((task, project))
    }

    fn settle(
        &self,
        task_id: TaskId,
        attempt: &mut u32,
        result: TaskRepositoryResult<()>,
    ) -> TaskServiceResult<CommitAttempt> {
        match result {
            Ok(()) => Ok(CommitAttempt::Committed),
            Err(TaskRepositoryError::VersionConflict {
                expected, actual, ..
            }) if *attempt < self.config.conflict_retries => {
                *attempt += 1;
                debug!(
                    task_id = %task_id,
                    expected,
                    actual,
                    attempt = *attempt,
                    "task version conflict, retrying"
                );
                Ok(CommitAttempt::Retry)
            }
            Err(TaskRepositoryError::VersionConflict { .. }) => {
                warn!(task_id = %task_id, attempts = *attempt + 1, "task version conflict, giving up");
                Err(TaskServiceError::ConcurrencyConflict(task_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn publish(
        &self,
        project_id: ProjectId,
        change: DomainChange,
        causation: Causation,
    ) -> DomainEvent {
        let event = DomainEvent::new(project_id, change, causation, &*self.clock);
        self.dispatcher.publish(&event);
        event
    }
}

fn resolve_status(project: &Project, raw: &str) -> TaskServiceResult<StatusName> {
    let invalid = || TaskServiceError::InvalidStatus {
        project_id: project.id(),
        status: raw.to_owned(),
    };
    let status = StatusName::new(raw).map_err(|_| invalid())?;
    if project.statuses().contains(&status) {
        Ok(status)
    } else {
        Err(invalid())
    }
}

fn ensure_assignable(project: &Project, assignee: UserId) -> TaskServiceResult<()> {
    if project.is_member(assignee) {
        Ok(())
    } else {
        Err(TaskServiceError::AssigneeNotMember(assignee))
    }
}

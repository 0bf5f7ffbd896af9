//! Request and result types for task state machine operations.

use crate::event::DomainEvent;
use crate::project::domain::{ProjectId, UserId};
use crate::task::domain::{Priority, Task, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(rename = "project")]
    project_id: ProjectId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    assignee: Option<UserId>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with required fields. The task lands in the
    /// project's first status column unless [`Self::with_status`] is used.
    #[must_use]
    pub fn new(project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            project_id,
            title: title.into(),
            description: None,
            status: None,
            assignee: None,
            priority: Priority::default(),
            due_date: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial status column.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Returns the target project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub(super) fn into_parts(self) -> CreateTaskParts {
        CreateTaskParts {
            project_id: self.project_id,
            title: self.title,
            description: self.description,
            status: self.status,
            assignee: self.assignee,
            priority: self.priority,
            due_date: self.due_date,
        }
    }
}

pub(super) struct CreateTaskParts {
    pub(super) project_id: ProjectId,
    pub(super) title: String,
    pub(super) description: Option<String>,
    pub(super) status: Option<String>,
    pub(super) assignee: Option<UserId>,
    pub(super) priority: Priority,
    pub(super) due_date: Option<DateTime<Utc>>,
}

/// Transition request `{taskId, newStatus}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    /// Task to move.
    pub task_id: TaskId,
    /// Destination status name.
    pub new_status: String,
}

impl MoveTaskRequest {
    /// Creates a transition request.
    #[must_use]
    pub fn new(task_id: TaskId, new_status: impl Into<String>) -> Self {
        Self {
            task_id,
            new_status: new_status.into(),
        }
    }
}

/// A committed task mutation and the event it produced.
///
/// The event is `None` when the operation was a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCommit {
    task: Task,
    event: Option<DomainEvent>,
}

impl TaskCommit {
    pub(crate) const fn new(task: Task, event: Option<DomainEvent>) -> Self {
        Self { task, event }
    }

    /// Returns the task as committed.
    #[must_use]
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Returns the published event, if anything changed.
    #[must_use]
    pub const fn event(&self) -> Option<&DomainEvent> {
        self.event.as_ref()
    }

    /// Splits the commit into its task and event.
    #[must_use]
    pub fn into_parts(self) -> (Task, Option<DomainEvent>) {
        (self.task, self.event)
    }
}

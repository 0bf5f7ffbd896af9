//! Named wire messages built from domain events.

use super::RoomKey;
use crate::automation::domain::{ActionOutcome, AutomationId};
use crate::event::{DomainChange, DomainEvent};
use crate::project::domain::{Member, Project, ProjectId, StatusRegistry, StatusName, UserId};
use crate::task::domain::{Comment, Task, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Wire event names. The strings are part of the client contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    /// `project_updated`
    ProjectUpdated,
    /// `project_deleted`
    ProjectDeleted,
    /// `member_added`
    MemberAdded,
    /// `member_removed`
    MemberRemoved,
    /// `statuses_updated`
    StatusesUpdated,
    /// `task_created`
    TaskCreated,
    /// `task_updated`
    TaskUpdated,
    /// `task_deleted`
    TaskDeleted,
    /// `task_moved`
    TaskMoved,
    /// `comment_added`
    CommentAdded,
    /// `automation_triggered`
    AutomationTriggered,
}

impl EventName {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectUpdated => "project_updated",
            Self::ProjectDeleted => "project_deleted",
            Self::MemberAdded => "member_added",
            Self::MemberRemoved => "member_removed",
            Self::StatusesUpdated => "statuses_updated",
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
            Self::TaskDeleted => "task_deleted",
            Self::TaskMoved => "task_moved",
            Self::CommentAdded => "comment_added",
            Self::AutomationTriggered => "automation_triggered",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named event addressed to a project room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealtimeMessage {
    room: RoomKey,
    event: EventName,
    payload: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectDeletedPayload {
    project_id: ProjectId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberAddedPayload<'a> {
    project: &'a Project,
    member: &'a Member,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MemberRemovedPayload<'a> {
    project: &'a Project,
    member_id: UserId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusesUpdatedPayload<'a> {
    project: &'a Project,
    statuses: &'a StatusRegistry,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskDeletedPayload {
    task_id: TaskId,
    project_id: ProjectId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskMovedPayload<'a> {
    task: &'a Task,
    prev_status: &'a StatusName,
    new_status: &'a StatusName,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommentAddedPayload<'a> {
    task_id: TaskId,
    comment: &'a Comment,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AutomationTriggeredPayload<'a> {
    automation_id: AutomationId,
    name: &'a str,
    project_id: ProjectId,
    task_id: TaskId,
    outcome: &'a ActionOutcome,
    execution_count: u64,
}

impl RealtimeMessage {
    /// Builds the wire message for a committed domain event.
    ///
    /// Assignment, field, and overdue changes all travel as `task_updated`
    /// carrying the full task.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when the payload cannot be serialized.
    pub fn from_event(event: &DomainEvent) -> Result<Self, serde_json::Error> {
        let project_id = event.project_id();
        let (name, payload) = match event.change() {
            DomainChange::ProjectUpdated { project } => {
                (EventName::ProjectUpdated, serde_json::to_value(project)?)
            }
            DomainChange::ProjectDeleted => (
                EventName::ProjectDeleted,
                serde_json::to_value(ProjectDeletedPayload { project_id })?,
            ),
            DomainChange::MemberAdded { project, member } => (
                EventName::MemberAdded,
                serde_json::to_value(MemberAddedPayload { project, member })?,
            ),
            DomainChange::MemberRemoved { project, member_id } => (
                EventName::MemberRemoved,
                serde_json::to_value(MemberRemovedPayload {
                    project,
                    member_id: *member_id,
                })?,
            ),
            DomainChange::StatusesUpdated { project } => (
                EventName::StatusesUpdated,
                serde_json::to_value(StatusesUpdatedPayload {
                    project,
                    statuses: project.statuses(),
                })?,
            ),
            DomainChange::TaskCreated { task } => {
                (EventName::TaskCreated, serde_json::to_value(task)?)
            }
            DomainChange::TaskUpdated { task }
            | DomainChange::TaskAssigned { task, .. }
            | DomainChange::DueDatePassed { task } => {
                (EventName::TaskUpdated, serde_json::to_value(task)?)
            }
            DomainChange::TaskDeleted { task_id } => (
                EventName::TaskDeleted,
                serde_json::to_value(TaskDeletedPayload {
                    task_id: *task_id,
                    project_id,
                })?,
            ),
            DomainChange::TaskMoved {
                task,
                from_status,
                to_status,
            } => (
                EventName::TaskMoved,
                serde_json::to_value(TaskMovedPayload {
                    task,
                    prev_status: from_status,
                    new_status: to_status,
                })?,
            ),
            DomainChange::CommentAdded { task, comment } => (
                EventName::CommentAdded,
                serde_json::to_value(CommentAddedPayload {
                    task_id: task.id(),
                    comment,
                })?,
            ),
            DomainChange::AutomationTriggered {
                automation_id,
                name,
                task_id,
                outcome,
                execution_count,
            } => (
                EventName::AutomationTriggered,
                serde_json::to_value(AutomationTriggeredPayload {
                    automation_id: *automation_id,
                    name,
                    project_id,
                    task_id: *task_id,
                    outcome,
                    execution_count: *execution_count,
                })?,
            ),
        };
        Ok(Self {
            room: RoomKey::for_project(project_id),
            event: name,
            payload,
        })
    }

    /// Returns the destination room.
    #[must_use]
    pub const fn room(&self) -> &RoomKey {
        &self.room
    }

    /// Returns the wire event name.
    #[must_use]
    pub const fn event(&self) -> EventName {
        self.event
    }

    /// Returns the JSON payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }
}

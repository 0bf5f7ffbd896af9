//! Domain event records emitted once per committed change.

use super::Causation;
use crate::automation::domain::{ActionOutcome, AutomationId, TriggerKind};
use crate::project::domain::{Member, Project, ProjectId, StatusName, UserId};
use crate::task::domain::{Comment, Task, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;

/// The committed change an event describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainChange {
    /// A task was created.
    TaskCreated {
        /// Task as committed.
        task: Task,
    },
    /// Task fields (title, description, priority, due date) changed.
    TaskUpdated {
        /// Task as committed.
        task: Task,
    },
    /// The assignee changed.
    TaskAssigned {
        /// Task as committed.
        task: Task,
        /// Assignee before the change.
        previous_assignee: Option<UserId>,
        /// Assignee after the change.
        new_assignee: Option<UserId>,
    },
    /// The task changed status column.
    TaskMoved {
        /// Task as committed.
        task: Task,
        /// Status the task left.
        from_status: StatusName,
        /// Status the task entered.
        to_status: StatusName,
    },
    /// A comment was added to a task.
    CommentAdded {
        /// Task as committed.
        task: Task,
        /// The new comment.
        comment: Comment,
    },
    /// A task was deleted.
    TaskDeleted {
        /// Identifier of the removed task.
        task_id: TaskId,
    },
    /// A task's due date elapsed.
    DueDatePassed {
        /// Task as committed, overdue marker set.
        task: Task,
    },
    /// Project title or description changed.
    ProjectUpdated {
        /// Project as committed.
        project: Project,
    },
    /// A project and its tasks were deleted.
    ProjectDeleted,
    /// A member joined the project.
    MemberAdded {
        /// Project as committed.
        project: Project,
        /// The new membership.
        member: Member,
    },
    /// A member left the project.
    MemberRemoved {
        /// Project as committed.
        project: Project,
        /// The removed user.
        member_id: UserId,
    },
    /// The status registry was replaced.
    StatusesUpdated {
        /// Project as committed.
        project: Project,
    },
    /// An automation ran against a task.
    AutomationTriggered {
        /// The automation that ran.
        automation_id: AutomationId,
        /// Its name at execution time.
        name: String,
        /// The task the triggering event concerned.
        task_id: TaskId,
        /// What the action did.
        outcome: ActionOutcome,
        /// Execution count after bookkeeping.
        execution_count: u64,
    },
}

impl DomainChange {
    /// Returns the automation trigger kind this change can fire, if any.
    #[must_use]
    pub const fn trigger_kind(&self) -> Option<TriggerKind> {
        match self {
            Self::TaskCreated { .. } => Some(TriggerKind::TaskCreated),
            Self::TaskAssigned { .. } => Some(TriggerKind::TaskAssigned),
            Self::TaskMoved { .. } => Some(TriggerKind::TaskMoved),
            Self::DueDatePassed { .. } => Some(TriggerKind::DueDatePassed),
            Self::TaskUpdated { .. }
            | Self::CommentAdded { .. }
            | Self::TaskDeleted { .. }
            | Self::ProjectUpdated { .. }
            | Self::ProjectDeleted
            | Self::MemberAdded { .. }
            | Self::MemberRemoved { .. }
            | Self::StatusesUpdated { .. }
            | Self::AutomationTriggered { .. } => None,
        }
    }

    /// Returns the committed task snapshot carried by the change, if any.
    #[must_use]
    pub const fn task(&self) -> Option<&Task> {
        match self {
            Self::TaskCreated { task }
            | Self::TaskUpdated { task }
            | Self::TaskAssigned { task, .. }
            | Self::TaskMoved { task, .. }
            | Self::CommentAdded { task, .. }
            | Self::DueDatePassed { task } => Some(task),
            Self::TaskDeleted { .. }
            | Self::ProjectUpdated { .. }
            | Self::ProjectDeleted
            | Self::MemberAdded { .. }
            | Self::MemberRemoved { .. }
            | Self::StatusesUpdated { .. }
            | Self::AutomationTriggered { .. } => None,
        }
    }
}

/// Ephemeral record of one committed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainEvent {
    project_id: ProjectId,
    change: DomainChange,
    causation: Causation,
    occurred_at: DateTime<Utc>,
}

impl DomainEvent {
    /// Creates an event stamped with the current clock time.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        change: DomainChange,
        causation: Causation,
        clock: &impl Clock,
    ) -> Self {
        Self {
            project_id,
            change,
            causation,
            occurred_at: clock.utc(),
        }
    }

    /// Returns the project the change belongs to.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the change.
    #[must_use]
    pub const fn change(&self) -> &DomainChange {
        &self.change
    }

    /// Returns the causation.
    #[must_use]
    pub const fn causation(&self) -> &Causation {
        &self.causation
    }

    /// Returns when the change was committed.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns the automation trigger kind this event can fire, if any.
    #[must_use]
    pub const fn trigger_kind(&self) -> Option<TriggerKind> {
        self.change.trigger_kind()
    }

    /// Returns the task snapshot carried by the event, if any.
    #[must_use]
    pub const fn task(&self) -> Option<&Task> {
        self.change.task()
    }
}

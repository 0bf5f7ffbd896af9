//! Task aggregate root and field change sets.

use super::{
    Actor, Comment, CommentId, HistoryAction, HistoryEntry, Priority, TaskDomainError, TaskId,
};
use crate::project::domain::{ProjectId, StatusName, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning project.
    pub project_id: ProjectId,
    /// Task title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Initial status column, already checked against the registry.
    pub status: StatusName,
    /// Optional assignee, already checked for membership.
    pub assignee: Option<UserId>,
    /// Creating user.
    pub creator: UserId,
    /// Priority.
    pub priority: Priority,
    /// Optional due date.
    pub due_date: Option<DateTime<Utc>>,
}

/// Set of field edits applied by [`Task::apply_changes`].
///
/// A field left untouched is not changed. Description and due date use a
/// nested option so they can be cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFieldChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due_date: Option<Option<DateTime<Utc>>>,
}

impl TaskFieldChanges {
    /// Creates an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets or clears the description.
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    /// Sets a new priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<DateTime<Utc>>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Returns `true` when no field is touched.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Task aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    title: String,
    description: Option<String>,
    status: StatusName,
    assignee: Option<UserId>,
    creator: UserId,
    priority: Priority,
    due_date: Option<DateTime<Utc>>,
    order: i64,
    history: Vec<HistoryEntry>,
    comments: Vec<Comment>,
    version: u64,
    overdue: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn normalize_title(title: &str) -> Result<String, TaskDomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

fn format_due_date(due_date: Option<DateTime<Utc>>) -> Option<String> {
    due_date.map(|date| date.to_rfc3339())
}

impl Task {
    /// Creates a task at the given column position and records its creation.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn new(
        data: NewTask,
        order: i64,
        actor: Actor,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let timestamp = clock.utc();
        let created = HistoryEntry::new(
            actor,
            HistoryAction::Created,
            None,
            Some(data.status.to_string()),
            timestamp,
        );
        Ok(Self {
            id: TaskId::new(),
            project_id: data.project_id,
            title: normalize_title(&data.title)?,
            description: normalize_description(data.description),
            status: data.status,
            assignee: data.assignee,
            creator: data.creator,
            priority: data.priority,
            due_date: data.due_date,
            order,
            history: vec![created],
            comments: Vec::new(),
            version: 0,
            overdue: false,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the current status column.
    #[must_use]
    pub const fn status(&self) -> &StatusName {
        &self.status
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the creator.
    #[must_use]
    pub const fn creator(&self) -> UserId {
        self.creator
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    /// Returns the position within the status column.
    #[must_use]
    pub const fn order(&self) -> i64 {
        self.order
    }

    /// Returns the history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Returns the comments, oldest first.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns `true` once the due-date-passed event has been emitted for
    /// the current due date.
    #[must_use]
    pub const fn is_overdue(&self) -> bool {
        self.overdue
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the task into a status column at the given position.
    ///
    /// Returns the status the task left.
    pub fn move_to(
        &mut self,
        status: StatusName,
        order: i64,
        actor: Actor,
        clock: &impl Clock,
    ) -> StatusName {
        let previous = std::mem::replace(&mut self.status, status);
        self.order = order;
        self.record(
            actor,
            HistoryAction::Moved,
            Some(previous.to_string()),
            Some(self.status.to_string()),
            clock,
        );
        self.touch(clock);
        previous
    }

    /// Replaces the assignee.
    ///
    /// Returns `false` without recording anything when the assignee is
    /// unchanged.
    pub fn reassign(&mut self, assignee: Option<UserId>, actor: Actor, clock: &impl Clock) -> bool {
        if self.assignee == assignee {
            return false;
        }
        let previous = std::mem::replace(&mut self.assignee, assignee);
        self.record(
            actor,
            HistoryAction::Assigned,
            previous.map(|user| user.to_string()),
            assignee.map(|user| user.to_string()),
            clock,
        );
        self.touch(clock);
        true
    }

    /// Applies field edits, recording one history entry per changed field.
    ///
    /// Returns the recorded actions; empty when nothing changed. A new due
    /// date clears the overdue marker.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the new title is blank.
    /// The task is left untouched on error.
    pub fn apply_changes(
        &mut self,
        changes: TaskFieldChanges,
        actor: Actor,
        clock: &impl Clock,
    ) -> Result<Vec<HistoryAction>, TaskDomainError> {
        let new_title = changes
            .title
            .as_deref()
            .map(normalize_title)
            .transpose()?;
        let mut applied = Vec::new();

        if let Some(title) = new_title
            && title != self.title
        {
            let previous = std::mem::replace(&mut self.title, title);
            self.record(
                actor,
                HistoryAction::UpdatedTitle,
                Some(previous),
                Some(self.title.clone()),
                clock,
            );
            applied.push(HistoryAction::UpdatedTitle);
        }

        if let Some(raw_description) = changes.description {
            let description = normalize_description(raw_description);
            if description != self.description {
                let previous = std::mem::replace(&mut self.description, description);
                self.record(
                    actor,
                    HistoryAction::UpdatedDescription,
                    previous,
                    self.description.clone(),
                    clock,
                );
                applied.push(HistoryAction::UpdatedDescription);
            }
        }

        if let Some(priority) = changes.priority
            && priority != self.priority
        {
            let previous = std::mem::replace(&mut self.priority, priority);
            self.record(
                actor,
                HistoryAction::UpdatedPriority,
                Some(previous.as_str().to_owned()),
                Some(priority.as_str().to_owned()),
                clock,
            );
            applied.push(HistoryAction::UpdatedPriority);
        }

        if let Some(due_date) = changes.due_date
            && due_date != self.due_date
        {
            let previous = std::mem::replace(&mut self.due_date, due_date);
            self.overdue = false;
            self.record(
                actor,
                HistoryAction::UpdatedDueDate,
                format_due_date(previous),
                format_due_date(due_date),
                clock,
            );
            applied.push(HistoryAction::UpdatedDueDate);
        }

        if !applied.is_empty() {
            self.touch(clock);
        }
        Ok(applied)
    }

    /// Appends a comment and records it in the history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyComment`] when the text is blank.
    pub fn add_comment(
        &mut self,
        author: UserId,
        text: &str,
        clock: &impl Clock,
    ) -> Result<Comment, TaskDomainError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyComment);
        }
        let comment = Comment::new(CommentId::new(), author, trimmed.to_owned(), clock.utc());
        self.comments.push(comment.clone());
        self.record(
            Actor::User(author),
            HistoryAction::Commented,
            None,
            Some(comment.text().to_owned()),
            clock,
        );
        self.touch(clock);
        Ok(comment)
    }

    /// Returns `true` when the due date lies before `now` and the overdue
    /// event has not been emitted yet.
    #[must_use]
    pub fn is_due_for_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.overdue && self.due_date.is_some_and(|due| due < now)
    }

    /// Marks the task overdue and records it, at most once per due date.
    ///
    /// Returns `false` when the task is not past due or already marked.
    pub fn mark_overdue(&mut self, clock: &impl Clock) -> bool {
        if !self.is_due_for_overdue(clock.utc()) {
            return false;
        }
        self.overdue = true;
        self.record(
            Actor::System,
            HistoryAction::DueDatePassed,
            None,
            format_due_date(self.due_date),
            clock,
        );
        self.touch(clock);
        true
    }

    fn record(
        &mut self,
        actor: Actor,
        action: HistoryAction,
        prev_value: Option<String>,
        new_value: Option<String>,
        clock: &impl Clock,
    ) {
        self.history.push(HistoryEntry::new(
            actor,
            action,
            prev_value,
            new_value,
            clock.utc(),
        ));
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
        self.version = self.version.saturating_add(1);
    }
}

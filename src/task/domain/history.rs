//! Append-only task history records and comments.

use super::{Actor, CommentId};
use crate::project::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of change recorded in a task's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryAction {
    /// The task was created.
    #[serde(rename = "created")]
    Created,
    /// The task changed status column.
    #[serde(rename = "moved")]
    Moved,
    /// The assignee changed.
    #[serde(rename = "assigned")]
    Assigned,
    /// The title changed.
    #[serde(rename = "updated title")]
    UpdatedTitle,
    /// The description changed.
    #[serde(rename = "updated description")]
    UpdatedDescription,
    /// The due date changed.
    #[serde(rename = "updated due date")]
    UpdatedDueDate,
    /// The priority changed.
    #[serde(rename = "updated priority")]
    UpdatedPriority,
    /// A comment was added.
    #[serde(rename = "commented")]
    Commented,
    /// The due date elapsed while the task was open.
    #[serde(rename = "due date passed")]
    DueDatePassed,
}

impl HistoryAction {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Moved => "moved",
            Self::Assigned => "assigned",
            Self::UpdatedTitle => "updated title",
            Self::UpdatedDescription => "updated description",
            Self::UpdatedDueDate => "updated due date",
            Self::UpdatedPriority => "updated priority",
            Self::Commented => "commented",
            Self::DueDatePassed => "due date passed",
        }
    }
}

/// One entry in a task's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    actor: Actor,
    action: HistoryAction,
    prev_value: Option<String>,
    new_value: Option<String>,
    timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates a history entry.
    #[must_use]
    pub const fn new(
        actor: Actor,
        action: HistoryAction,
        prev_value: Option<String>,
        new_value: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            actor,
            action,
            prev_value,
            new_value,
            timestamp,
        }
    }

    /// Returns who made the change.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        self.actor
    }

    /// Returns the kind of change.
    #[must_use]
    pub const fn action(&self) -> HistoryAction {
        self.action
    }

    /// Returns the value before the change.
    #[must_use]
    pub fn prev_value(&self) -> Option<&str> {
        self.prev_value.as_deref()
    }

    /// Returns the value after the change.
    #[must_use]
    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    /// Returns when the change happened.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Comment left on a task by a project member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    id: CommentId,
    author: UserId,
    text: String,
    created_at: DateTime<Utc>,
}

impl Comment {
    pub(super) const fn new(
        id: CommentId,
        author: UserId,
        text: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author,
            text,
            created_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the comment text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns when the comment was posted.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

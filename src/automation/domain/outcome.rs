//! Result of executing one automation action.

use crate::project::domain::{StatusName, UserId};
use serde::{Deserialize, Serialize};

/// What an action did when it ran.
///
/// Every variant counts as an execution for bookkeeping purposes, including
/// no-ops and failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActionOutcome {
    /// A badge was appended to the assignee's badge list.
    BadgeAwarded {
        /// User who received the badge.
        recipient: UserId,
        /// Name of the badge.
        badge_name: String,
    },
    /// The task had no assignee, so no badge was awarded.
    NoAssignee,
    /// The task was moved to another column.
    TaskMoved {
        /// Status the task left.
        from_status: StatusName,
        /// Status the task entered.
        to_status: StatusName,
    },
    /// A notification was handed to the delivery collaborator.
    NotificationDelivered {
        /// Addressee of the notification.
        recipient: UserId,
    },
    /// The action failed or timed out; the failure was logged.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}

impl ActionOutcome {
    /// Creates a failure outcome.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`ActionOutcome::Failed`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Returns a short label for logging.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::BadgeAwarded { .. } => "badge_awarded",
            Self::NoAssignee => "no_assignee",
            Self::TaskMoved { .. } => "task_moved",
            Self::NotificationDelivered { .. } => "notification_delivered",
            Self::Failed { .. } => "failed",
        }
    }
}

//! Automation actions: what a rule does when its trigger matches.

use super::{AutomationDomainError, trigger::present};
use crate::project::domain::{StatusName, StatusRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of effect an automation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    /// Award a badge to the task's assignee.
    AssignBadge,
    /// Move the task to another status column.
    MoveTask,
    /// Send a notification about the task.
    SendNotification,
}

impl ActionKind {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AssignBadge => "assignBadge",
            Self::MoveTask => "moveTask",
            Self::SendNotification => "sendNotification",
        }
    }
}

impl TryFrom<&str> for ActionKind {
    type Error = AutomationDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "assignBadge" => Ok(Self::AssignBadge),
            "moveTask" => Ok(Self::MoveTask),
            "sendNotification" => Ok(Self::SendNotification),
            _ => Err(AutomationDomainError::UnknownActionKind(value.to_owned())),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw action details as submitted by clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDetails {
    /// Badge to award (`assignBadge`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_name: Option<String>,
    /// Badge description (`assignBadge`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_description: Option<String>,
    /// Destination status (`moveTask`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_status: Option<String>,
    /// Notification text (`sendNotification`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_message: Option<String>,
}

/// Raw action `{type, details}` as submitted by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPayload {
    /// Action kind name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific details.
    #[serde(default)]
    pub details: ActionDetails,
}

impl ActionPayload {
    /// Creates an `assignBadge` payload.
    #[must_use]
    pub fn assign_badge(name: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::AssignBadge.as_str().to_owned(),
            details: ActionDetails {
                badge_name: Some(name.into()),
                ..ActionDetails::default()
            },
        }
    }

    /// Creates a `moveTask` payload.
    #[must_use]
    pub fn move_task(target_status: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::MoveTask.as_str().to_owned(),
            details: ActionDetails {
                target_status: Some(target_status.into()),
                ..ActionDetails::default()
            },
        }
    }

    /// Creates a `sendNotification` payload.
    #[must_use]
    pub fn send_notification(message: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::SendNotification.as_str().to_owned(),
            details: ActionDetails {
                notification_message: Some(message.into()),
                ..ActionDetails::default()
            },
        }
    }

    /// Sets the badge description.
    #[must_use]
    pub fn with_badge_description(mut self, description: impl Into<String>) -> Self {
        self.details.badge_description = Some(description.into());
        self
    }
}

/// Validated action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ActionPayload", into = "ActionPayload")]
pub enum Action {
    /// Award a badge to the task's assignee.
    AssignBadge {
        /// Badge name.
        badge_name: String,
        /// Optional badge description.
        badge_description: Option<String>,
    },
    /// Move the task to another column.
    MoveTask {
        /// Destination status.
        target_status: StatusName,
    },
    /// Notify the assignee, or the project owner when unassigned.
    SendNotification {
        /// Notification text.
        message: String,
    },
}

impl Action {
    /// Returns the action kind.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::AssignBadge { .. } => ActionKind::AssignBadge,
            Self::MoveTask { .. } => ActionKind::MoveTask,
            Self::SendNotification { .. } => ActionKind::SendNotification,
        }
    }

    /// Checks that the destination of a `moveTask` action exists in the
    /// registry.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationDomainError::UnknownStatus`] when it does not.
    pub fn check_statuses(&self, registry: &StatusRegistry) -> Result<(), AutomationDomainError> {
        match self {
            Self::MoveTask { target_status } if !registry.contains(target_status) => Err(
                AutomationDomainError::UnknownStatus(target_status.to_string()),
            ),
            _ => Ok(()),
        }
    }
}

impl TryFrom<ActionPayload> for Action {
    type Error = AutomationDomainError;

    fn try_from(payload: ActionPayload) -> Result<Self, Self::Error> {
        let action = ActionKind::try_from(payload.kind.as_str())?;
        let details = payload.details;
        let badge_name = present(details.badge_name);
        let badge_description = present(details.badge_description);
        let target_status = present(details.target_status);
        let notification_message = present(details.notification_message);

        let missing = |field| AutomationDomainError::MissingDetail { action, field };
        let inapplicable = |field| AutomationDomainError::InapplicableDetail { action, field };
        let reject_present = |value: &Option<String>, field| match value {
            Some(_) => Err(inapplicable(field)),
            None => Ok(()),
        };

        match action {
            ActionKind::AssignBadge => {
                reject_present(&target_status, "targetStatus")?;
                reject_present(&notification_message, "notificationMessage")?;
                Ok(Self::AssignBadge {
                    badge_name: badge_name.ok_or_else(|| missing("badgeName"))?,
                    badge_description,
                })
            }
            ActionKind::MoveTask => {
                reject_present(&badge_name, "badgeName")?;
                reject_present(&badge_description, "badgeDescription")?;
                reject_present(&notification_message, "notificationMessage")?;
                let target = target_status.ok_or_else(|| missing("targetStatus"))?;
                Ok(Self::MoveTask {
                    target_status: StatusName::new(target)
                        .map_err(|_| AutomationDomainError::EmptyStatusName)?,
                })
            }
            ActionKind::SendNotification => {
                reject_present(&badge_name, "badgeName")?;
                reject_present(&badge_description, "badgeDescription")?;
                reject_present(&target_status, "targetStatus")?;
                Ok(Self::SendNotification {
                    message: notification_message.ok_or_else(|| missing("notificationMessage"))?,
                })
            }
        }
    }
}

impl From<Action> for ActionPayload {
    fn from(action: Action) -> Self {
        let kind = action.kind().as_str().to_owned();
        let details = match action {
            Action::AssignBadge {
                badge_name,
                badge_description,
            } => ActionDetails {
                badge_name: Some(badge_name),
                badge_description,
                ..ActionDetails::default()
            },
            Action::MoveTask { target_status } => ActionDetails {
                target_status: Some(target_status.into()),
                ..ActionDetails::default()
            },
            Action::SendNotification { message } => ActionDetails {
                notification_message: Some(message),
                ..ActionDetails::default()
            },
        };
        Self { kind, details }
    }
}

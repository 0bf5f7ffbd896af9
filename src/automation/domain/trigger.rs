//! Automation triggers: what kind of event a rule listens for.

use super::AutomationDomainError;
use crate::event::DomainChange;
use crate::project::domain::{StatusName, StatusRegistry, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of event an automation listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerKind {
    /// A task changed status column.
    TaskMoved,
    /// A task's assignee changed.
    TaskAssigned,
    /// A task's due date elapsed.
    DueDatePassed,
    /// A task was created.
    TaskCreated,
}

impl TriggerKind {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskMoved => "taskMoved",
            Self::TaskAssigned => "taskAssigned",
            Self::DueDatePassed => "dueDatePassed",
            Self::TaskCreated => "taskCreated",
        }
    }
}

impl TryFrom<&str> for TriggerKind {
    type Error = AutomationDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "taskMoved" => Ok(Self::TaskMoved),
            "taskAssigned" => Ok(Self::TaskAssigned),
            "dueDatePassed" => Ok(Self::DueDatePassed),
            "taskCreated" => Ok(Self::TaskCreated),
            _ => Err(AutomationDomainError::UnknownTriggerKind(value.to_owned())),
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw trigger conditions as submitted by clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConditions {
    /// Status the task must leave (`taskMoved`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_status: Option<String>,
    /// Status the task must enter (`taskMoved`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_status: Option<String>,
    /// New assignee to match (`taskAssigned`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserId>,
}

/// Raw trigger `{type, conditions}` as submitted by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPayload {
    /// Trigger kind name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific conditions.
    #[serde(default)]
    pub conditions: TriggerConditions,
}

impl TriggerPayload {
    /// Creates a payload with no conditions.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            conditions: TriggerConditions::default(),
        }
    }

    /// Sets the `fromStatus` condition.
    #[must_use]
    pub fn with_from_status(mut self, status: impl Into<String>) -> Self {
        self.conditions.from_status = Some(status.into());
        self
    }

    /// Sets the `toStatus` condition.
    #[must_use]
    pub fn with_to_status(mut self, status: impl Into<String>) -> Self {
        self.conditions.to_status = Some(status.into());
        self
    }

    /// Sets the `assignee` condition.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.conditions.assignee = Some(assignee);
        self
    }
}

/// Validated trigger. Absent conditions match any value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TriggerPayload", into = "TriggerPayload")]
pub enum Trigger {
    /// Fires on status moves.
    TaskMoved {
        /// Required previous status.
        from_status: Option<StatusName>,
        /// Required new status.
        to_status: Option<StatusName>,
    },
    /// Fires on assignee changes.
    TaskAssigned {
        /// Required new assignee.
        assignee: Option<UserId>,
    },
    /// Fires when a due date elapses.
    DueDatePassed,
    /// Fires on task creation.
    TaskCreated,
}

pub(super) fn present(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

fn status_condition(value: Option<String>) -> Result<Option<StatusName>, AutomationDomainError> {
    present(value)
        .map(|name| StatusName::new(name).map_err(|_| AutomationDomainError::EmptyStatusName))
        .transpose()
}

impl Trigger {
    /// Returns the trigger kind.
    #[must_use]
    pub const fn kind(&self) -> TriggerKind {
        match self {
            Self::TaskMoved { .. } => TriggerKind::TaskMoved,
            Self::TaskAssigned { .. } => TriggerKind::TaskAssigned,
            Self::DueDatePassed => TriggerKind::DueDatePassed,
            Self::TaskCreated => TriggerKind::TaskCreated,
        }
    }

    /// Returns `true` when the change is of this trigger's kind and every
    /// present condition equals the corresponding field of the change.
    #[must_use]
    pub fn matches(&self, change: &DomainChange) -> bool {
        match (self, change) {
            (
                Self::TaskMoved {
                    from_status,
                    to_status,
                },
                DomainChange::TaskMoved {
                    from_status: moved_from,
                    to_status: moved_to,
                    ..
                },
            ) => {
                from_status.as_ref().is_none_or(|status| status == moved_from)
                    && to_status.as_ref().is_none_or(|status| status == moved_to)
            }
            (Self::TaskAssigned { assignee }, DomainChange::TaskAssigned { new_assignee, .. }) => {
                assignee.is_none_or(|wanted| Some(wanted) == *new_assignee)
            }
            (Self::DueDatePassed, DomainChange::DueDatePassed { .. })
            | (Self::TaskCreated, DomainChange::TaskCreated { .. }) => true,
            _ => false,
        }
    }

    /// Checks that every status the trigger names exists in the registry.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationDomainError::UnknownStatus`] for the first status
    /// the registry does not define.
    pub fn check_statuses(&self, registry: &StatusRegistry) -> Result<(), AutomationDomainError> {
        if let Self::TaskMoved {
            from_status,
            to_status,
        } = self
        {
            for status in [from_status, to_status].into_iter().flatten() {
                if !registry.contains(status) {
                    return Err(AutomationDomainError::UnknownStatus(status.to_string()));
                }
            }
        }
        Ok(())
    }
}

impl TryFrom<TriggerPayload> for Trigger {
    type Error = AutomationDomainError;

    fn try_from(payload: TriggerPayload) -> Result<Self, Self::Error> {
        let kind = TriggerKind::try_from(payload.kind.as_str())?;
        let conditions = payload.conditions;
        let from_status = status_condition(conditions.from_status)?;
        let to_status = status_condition(conditions.to_status)?;
        let assignee = conditions.assignee;
        let inapplicable = |field| AutomationDomainError::InapplicableCondition {
            trigger: kind,
            field,
        };

        if kind != TriggerKind::TaskMoved {
            if from_status.is_some() {
                return Err(inapplicable("fromStatus"));
            }
            if to_status.is_some() {
                return Err(inapplicable("toStatus"));
            }
        }
        if kind != TriggerKind::TaskAssigned && assignee.is_some() {
            return Err(inapplicable("assignee"));
        }

        Ok(match kind {
            TriggerKind::TaskMoved => Self::TaskMoved {
                from_status,
                to_status,
            },
            TriggerKind::TaskAssigned => Self::TaskAssigned { assignee },
            TriggerKind::DueDatePassed => Self::DueDatePassed,
            TriggerKind::TaskCreated => Self::TaskCreated,
        })
    }
}

impl From<Trigger> for TriggerPayload {
    fn from(trigger: Trigger) -> Self {
        let kind = trigger.kind().as_str().to_owned();
        let conditions = match trigger {
            Trigger::TaskMoved {
                from_status,
                to_status,
            } => TriggerConditions {
                from_status: from_status.map(String::from),
                to_status: to_status.map(String::from),
                assignee: None,
            },
            Trigger::TaskAssigned { assignee } => TriggerConditions {
                assignee,
                ..TriggerConditions::default()
            },
            Trigger::DueDatePassed | Trigger::TaskCreated => TriggerConditions::default(),
        };
        Self { kind, conditions }
    }
}

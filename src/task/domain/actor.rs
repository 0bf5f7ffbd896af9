//! Actors that change tasks: users, automations, and the scheduler.

use super::ParseActorError;
use crate::automation::domain::AutomationId;
use crate::project::domain::UserId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const AUTOMATION_PREFIX: &str = "automation:";
const SYSTEM_ACTOR: &str = "system";

/// Originator of a task change.
///
/// Serialized as `<user id>`, `automation:<automation id>`, or `system`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    /// A project member acting directly.
    User(UserId),
    /// An automation rule acting on the user's behalf.
    Automation(AutomationId),
    /// The scheduler (due-date sweeps).
    System,
}

impl Actor {
    /// Returns the acting user, if the actor is a user.
    #[must_use]
    pub const fn user(self) -> Option<UserId> {
        match self {
            Self::User(user) => Some(user),
            Self::Automation(_) | Self::System => None,
        }
    }
}

impl From<UserId> for Actor {
    fn from(value: UserId) -> Self {
        Self::User(value)
    }
}

impl From<AutomationId> for Actor {
    fn from(value: AutomationId) -> Self {
        Self::Automation(value)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(user) => write!(f, "{user}"),
            Self::Automation(id) => write!(f, "{AUTOMATION_PREFIX}{id}"),
            Self::System => f.write_str(SYSTEM_ACTOR),
        }
    }
}

impl FromStr for Actor {
    type Err = ParseActorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed == SYSTEM_ACTOR {
            return Ok(Self::System);
        }
        let invalid = || ParseActorError(value.to_owned());
        if let Some(raw_id) = trimmed.strip_prefix(AUTOMATION_PREFIX) {
            let automation_uuid = Uuid::parse_str(raw_id).map_err(|_| invalid())?;
            return Ok(Self::Automation(AutomationId::from_uuid(automation_uuid)));
        }
        let uuid = Uuid::parse_str(trimmed).map_err(|_| invalid())?;
        Ok(Self::User(UserId::from_uuid(uuid)))
    }
}

impl Serialize for Actor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Actor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

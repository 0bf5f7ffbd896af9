//! Causation chains linking automation-caused events to their origin.

use crate::automation::domain::AutomationId;
use crate::project::domain::UserId;
use crate::task::domain::Actor;
use serde::{Deserialize, Serialize};

/// Who initiated a change and which automations transitively produced it.
///
/// The chain is empty for user-initiated and scheduler-initiated events and
/// grows by one automation id per cascade step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Causation {
    actor: Actor,
    chain: Vec<AutomationId>,
}

impl Causation {
    /// Causation of a change made directly by a user.
    #[must_use]
    pub const fn user(user: UserId) -> Self {
        Self {
            actor: Actor::User(user),
            chain: Vec::new(),
        }
    }

    /// Causation of a change made by the scheduler.
    #[must_use]
    pub const fn system() -> Self {
        Self {
            actor: Actor::System,
            chain: Vec::new(),
        }
    }

    /// Causation of a change an automation makes in reaction to an event
    /// with this causation.
    #[must_use]
    pub fn caused_by(&self, automation: AutomationId) -> Self {
        let mut chain = self.chain.clone();
        chain.push(automation);
        Self {
            actor: Actor::Automation(automation),
            chain,
        }
    }

    /// Returns the actor that made the change.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        self.actor
    }

    /// Returns the automations that produced the change, oldest first.
    #[must_use]
    pub fn chain(&self) -> &[AutomationId] {
        &self.chain
    }

    /// Returns the number of automations in the chain.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// Returns `true` when the automation already contributed to the chain.
    #[must_use]
    pub fn involves(&self, automation: AutomationId) -> bool {
        self.chain.contains(&automation)
    }
}

//! Automation aggregate root.

use super::{Action, AutomationDomainError, AutomationId, Trigger};
use crate::event::DomainEvent;
use crate::project::domain::{ProjectId, StatusRegistry, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated input for creating an automation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAutomation {
    /// Owning project.
    pub project_id: ProjectId,
    /// Rule name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Creating user (the project owner).
    pub created_by: UserId,
    /// What the rule listens for.
    pub trigger: Trigger,
    /// What the rule does.
    pub action: Action,
}

/// An owner-defined rule reacting to task lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Automation {
    id: AutomationId,
    project_id: ProjectId,
    name: String,
    description: Option<String>,
    created_by: UserId,
    active: bool,
    trigger: Trigger,
    action: Action,
    execution_count: u64,
    last_executed: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn normalize_name(name: &str) -> Result<String, AutomationDomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AutomationDomainError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

impl Automation {
    /// Creates an active automation that has never run.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationDomainError::EmptyName`] when the name is blank.
    pub fn new(data: NewAutomation, clock: &impl Clock) -> Result<Self, AutomationDomainError> {
        let timestamp = clock.utc();
        Ok(Self {
            id: AutomationId::new(),
            project_id: data.project_id,
            name: normalize_name(&data.name)?,
            description: normalize_description(data.description),
            created_by: data.created_by,
            active: true,
            trigger: data.trigger,
            action: data.action,
            execution_count: 0,
            last_executed: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the automation identifier.
    #[must_use]
    pub const fn id(&self) -> AutomationId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the creator.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns `true` when the rule participates in matching.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the trigger.
    #[must_use]
    pub const fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Returns the action.
    #[must_use]
    pub const fn action(&self) -> &Action {
        &self.action
    }

    /// Returns how many times the rule has run.
    #[must_use]
    pub const fn execution_count(&self) -> u64 {
        self.execution_count
    }

    /// Returns when the rule last ran.
    #[must_use]
    pub const fn last_executed(&self) -> Option<DateTime<Utc>> {
        self.last_executed
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

    /// Returns `true` when the rule is active, belongs to the event's
    /// project, and its trigger matches the change.
    #[must_use]
    pub fn matches(&self, event: &DomainEvent) -> bool {
        self.active && self.project_id == event.project_id() && self.trigger.matches(event.change())
    }

    /// Checks every status the trigger and action name against a registry.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationDomainError::UnknownStatus`] for a status the
    /// registry does not define.
    pub fn check_statuses(&self, registry: &StatusRegistry) -> Result<(), AutomationDomainError> {
        self.trigger.check_statuses(registry)?;
        self.action.check_statuses(registry)
    }

    /// Renames the rule.
    ///
    /// # Errors
    ///
    /// Returns [`AutomationDomainError::EmptyName`] when the name is blank.
    pub fn rename(&mut self, name: &str, clock: &impl Clock) -> Result<(), AutomationDomainError> {
        self.name = normalize_name(name)?;
        self.touch(clock);
        Ok(())
    }

    /// Replaces or clears the description.
    pub fn set_description(&mut self, description: Option<String>, clock: &impl Clock) {
        self.description = normalize_description(description);
        self.touch(clock);
    }

    /// Activates or deactivates the rule.
    pub fn set_active(&mut self, active: bool, clock: &impl Clock) {
        self.active = active;
        self.touch(clock);
    }

    /// Replaces the trigger.
    pub fn replace_trigger(&mut self, trigger: Trigger, clock: &impl Clock) {
        self.trigger = trigger;
        self.touch(clock);
    }

    /// Replaces the action.
    pub fn replace_action(&mut self, action: Action, clock: &impl Clock) {
        self.action = action;
        self.touch(clock);
    }

    /// Records one execution. `last_executed` never moves backwards.
    pub fn record_execution(&mut self, at: DateTime<Utc>) {
        self.execution_count = self.execution_count.saturating_add(1);
        self.last_executed = Some(self.last_executed.map_or(at, |last| last.max(at)));
    }

    /// Keeps the higher execution count and later `last_executed` of this
    /// record and `stored`.
    pub fn carry_execution_stats(&mut self, stored: &Self) {
        self.execution_count = self.execution_count.max(stored.execution_count);
        self.last_executed = self.last_executed.max(stored.last_executed);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

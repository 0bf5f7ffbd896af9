//! Domain model for automation rules.
//!
//! Triggers and actions arrive from clients as loosely typed
//! `{type, conditions}` / `{type, details}` payloads. They are parsed into
//! tagged unions so that unknown kinds, missing required details, and
//! conditions that do not apply to a kind are explicit validation errors.

mod action;
mod automation;
mod badge;
mod error;
mod ids;
mod matcher;
mod outcome;
mod trigger;

pub use action::{Action, ActionDetails, ActionKind, ActionPayload};
pub use automation::{Automation, NewAutomation};
pub use badge::Badge;
pub use error::AutomationDomainError;
pub use ids::AutomationId;
pub use matcher::RuleMatcher;
pub use outcome::ActionOutcome;
pub use trigger::{Trigger, TriggerConditions, TriggerKind, TriggerPayload};

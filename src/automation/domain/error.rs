//! Error types for automation rule validation.

use super::{ActionKind, TriggerKind};
use thiserror::Error;

/// Errors returned while parsing or validating automation rules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AutomationDomainError {
    /// The automation name is empty after trimming.
    #[error("automation name must not be empty")]
    EmptyName,

    /// The trigger type is not one of the supported kinds.
    #[error("invalid trigger type: {0}")]
    UnknownTriggerKind(String),

    /// The action type is not one of the supported kinds.
    #[error("invalid action type: {0}")]
    UnknownActionKind(String),

    /// A condition was given that the trigger kind does not support.
    #[error("condition '{field}' does not apply to trigger {trigger}")]
    InapplicableCondition {
        /// Trigger kind being parsed.
        trigger: TriggerKind,
        /// Offending condition field.
        field: &'static str,
    },

    /// The action kind requires a detail that was not given.
    #[error("action {action} requires '{field}'")]
    MissingDetail {
        /// Action kind being parsed.
        action: ActionKind,
        /// Missing detail field.
        field: &'static str,
    },

    /// A detail was given that the action kind does not support.
    #[error("detail '{field}' does not apply to action {action}")]
    InapplicableDetail {
        /// Action kind being parsed.
        action: ActionKind,
        /// Offending detail field.
        field: &'static str,
    },

    /// A status name is blank.
    #[error("status name must not be empty")]
    EmptyStatusName,

    /// A referenced status is not in the project's registry.
    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

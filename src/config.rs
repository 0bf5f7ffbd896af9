//! Engine configuration.
//!
//! [`EngineConfig`] carries the tunables shared by the task state machine
//! and the automation engine. It deserializes from any serde source using
//! camelCase keys; missing keys fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default maximum causation chain length before a cascade is truncated.
pub const DEFAULT_HOP_LIMIT: usize = 10;

/// Default number of retries after an optimistic-concurrency conflict.
pub const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// Default bound on a single action execution, in milliseconds.
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 2_000;

/// Default maximum number of notifications returned by an inbox listing.
pub const DEFAULT_NOTIFICATION_LIST_LIMIT: usize = 50;

/// Tunables for the task state machine and automation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Maximum number of automations in a causation chain. An automation is
    /// not executed for an event whose chain already has this many entries.
    pub hop_limit: usize,
    /// Retries after a task version conflict before the operation fails.
    pub conflict_retries: u32,
    /// Upper bound on a single action execution, in milliseconds.
    pub action_timeout_ms: u64,
    /// Maximum number of notifications returned by an inbox listing.
    pub notification_list_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hop_limit: DEFAULT_HOP_LIMIT,
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
            notification_list_limit: DEFAULT_NOTIFICATION_LIST_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration suited to deterministic tests: short action
    /// timeout and no conflict retries.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            hop_limit: DEFAULT_HOP_LIMIT,
            conflict_retries: 0,
            action_timeout_ms: 250,
            notification_list_limit: DEFAULT_NOTIFICATION_LIST_LIMIT,
        }
    }

    /// Overrides the cascade hop limit.
    #[must_use]
    pub const fn with_hop_limit(mut self, hop_limit: usize) -> Self {
        self.hop_limit = hop_limit;
        self
    }

    /// Overrides the number of conflict retries.
    #[must_use]
    pub const fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = retries;
        self
    }

    /// Overrides the action timeout.
    #[must_use]
    pub const fn with_action_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.action_timeout_ms = timeout_ms;
        self
    }

    /// Returns the action timeout as a [`Duration`].
    #[must_use]
    pub const fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// Checks that the configuration can drive the engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroHopLimit`] when the hop limit is zero
    /// and [`ConfigError::ZeroActionTimeout`] when the action timeout is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.hop_limit == 0 {
            return Err(ConfigError::ZeroHopLimit);
        }
        if self.action_timeout_ms == 0 {
            return Err(ConfigError::ZeroActionTimeout);
        }
        Ok(())
    }
}

/// Errors returned when validating an [`EngineConfig`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A zero hop limit would disable every automation.
    #[error("hop limit must be at least 1")]
    ZeroHopLimit,

    /// A zero timeout would fail every action.
    #[error("action timeout must be greater than zero")]
    ZeroActionTimeout,
}

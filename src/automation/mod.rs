//! Automation rules, rule matching, and action execution.
//!
//! Project owners define automations that react to task lifecycle events.
//! The [`services::AutomationEngine`] drains a worklist of domain events,
//! asks the [`domain::RuleMatcher`] which rules fire, runs their actions
//! through the [`services::ActionExecutor`], and feeds events produced by
//! those actions back into the worklist until the cascade settles or is
//! truncated. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

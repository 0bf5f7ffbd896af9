//! Task lifecycle and the task state machine.
//!
//! Tasks move between the status columns of their project. The state
//! machine validates every status against the project's registry at commit
//! time, assigns column order, appends history, and publishes a domain
//! event for each committed change. The module follows hexagonal
//! architecture:
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

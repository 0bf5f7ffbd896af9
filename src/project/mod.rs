//! Projects, membership, and the per-project status registry.
//!
//! A project owns an ordered registry of status columns that every task of
//! the project must reference, and a member list whose roles gate the
//! operations available to each caller. The module follows hexagonal
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

//! Domain events and causation tracking.
//!
//! Every committed change to a task, project, or automation produces exactly
//! one [`DomainEvent`]. Events feed the automation engine and, through the
//! [`crate::realtime`] dispatcher, every client watching the project.

mod causation;
mod domain_event;

pub use causation::Causation;
pub use domain_event::{DomainChange, DomainEvent};

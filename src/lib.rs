//! Taskboard: project boards with task automation rules.
//!
//! This crate provides the core of a collaborative task board: the task
//! state machine that moves work items between per-project status columns,
//! the automation rule engine that reacts to task lifecycle events, and the
//! real-time distribution layer that broadcasts every committed change to the
//! clients watching a project.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory stores,
//!   subscription fan-out)
//!
//! # Modules
//!
//! - [`project`]: Projects, membership, and the per-project status registry
//! - [`task`]: Task aggregate and the task state machine
//! - [`automation`]: Automation rules, rule matching, and action execution
//! - [`event`]: Domain events and causation tracking
//! - [`realtime`]: Event dispatch and project subscriptions
//! - [`notification`]: Notification records and delivery
//! - [`board`]: Facade running user operations through the automation engine

pub mod automation;
pub mod board;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod event;
pub mod notification;
pub mod project;
pub mod realtime;
pub mod task;

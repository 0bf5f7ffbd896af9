//! User-facing facade running task operations through the automation
//! engine.
//!
//! Each operation commits through the task state machine, runs the
//! automation cascade for the committed event, and returns the task as
//! re-read after the cascade settled.

mod facade;

pub use facade::{Board, BoardError, BoardResult, OverdueSweep, SettledTask};

//! Domain model for tasks and their lifecycle.
//!
//! A task belongs to exactly one project, sits in one of the project's
//! status columns, and carries an append-only history of every change made
//! to it by users, automations, or the scheduler.

mod actor;
mod error;
mod history;
mod ids;
mod priority;
mod task;

pub use actor::Actor;
pub use error::{ParseActorError, ParsePriorityError, TaskDomainError};
pub use history::{Comment, HistoryAction, HistoryEntry};
pub use ids::{CommentId, TaskId};
pub use priority::Priority;
pub use task::{NewTask, Task, TaskFieldChanges};

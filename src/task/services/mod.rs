//! Application services for the task state machine.

mod requests;
mod state_machine;

pub use requests::{CreateTaskRequest, MoveTaskRequest, TaskCommit};
pub use state_machine::{TaskService, TaskServiceError, TaskServiceResult};

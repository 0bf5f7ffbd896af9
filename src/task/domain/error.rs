//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The comment text is empty after trimming.
    #[error("comment text must not be empty")]
    EmptyComment,
}

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParsePriorityError(pub String);

/// Error returned while parsing actor references.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid actor reference: {0}")]
pub struct ParseActorError(pub String);

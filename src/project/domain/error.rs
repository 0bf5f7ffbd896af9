//! Error types for project domain validation.

use super::UserId;
use thiserror::Error;

/// Errors returned while constructing or mutating project values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project title is empty after trimming.
    #[error("project title must not be empty")]
    EmptyTitle,

    /// A status name is empty after trimming.
    #[error("status name must not be empty")]
    EmptyStatusName,

    /// The status registry would contain no entries.
    #[error("a project must define at least one status")]
    EmptyStatusRegistry,

    /// Two registry entries share the same name.
    #[error("duplicate status name: {0}")]
    DuplicateStatus(String),

    /// The user is already a member of the project.
    #[error("user {0} is already a member of the project")]
    AlreadyMember(UserId),

    /// The user is not a member of the project.
    #[error("user {0} is not a member of the project")]
    NotMember(UserId),

    /// The owner's membership cannot be revoked.
    #[error("the project owner cannot be removed")]
    CannotRemoveOwner,
}

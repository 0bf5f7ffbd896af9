//! Cross-cutting error classification.
//!
//! Every service error in the crate maps onto one [`ErrorKind`] so callers
//! can translate failures into transport-level responses without matching
//! on each bounded context's error enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a failed core operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input referenced an unknown status, trigger, or action, or was
    /// otherwise malformed. Rejected before any mutation.
    Validation,
    /// The caller lacks the role the operation requires.
    Authorization,
    /// The target entity does not exist or the caller is not a member of
    /// its project.
    NotFound,
    /// Optimistic concurrency retries were exhausted.
    ConcurrencyConflict,
    /// The persistence collaborator failed.
    Persistence,
}

impl ErrorKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authorization => "authorization",
            Self::NotFound => "not_found",
            Self::ConcurrencyConflict => "concurrency_conflict",
            Self::Persistence => "persistence",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

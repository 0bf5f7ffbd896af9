//! Port for the per-user badge list.

use crate::automation::domain::Badge;
use crate::project::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for badge ledger operations.
pub type BadgeLedgerResult<T> = Result<T, BadgeLedgerError>;

/// Append-only record of the badges each user has earned.
#[async_trait]
pub trait BadgeLedger: Send + Sync {
    /// Appends a badge to the user's list.
    async fn award(&self, user: UserId, badge: Badge) -> BadgeLedgerResult<()>;

    /// Returns the user's badges in award order.
    async fn badges_for(&self, user: UserId) -> BadgeLedgerResult<Vec<Badge>>;
}

/// Errors returned by badge ledger implementations.
#[derive(Debug, Clone, Error)]
pub enum BadgeLedgerError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BadgeLedgerError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

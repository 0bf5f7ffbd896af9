//! Repository port for the per-user notification inbox.

use crate::notification::domain::{Notification, NotificationId};
use crate::project::domain::UserId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification repository operations.
pub type NotificationRepositoryResult<T> = Result<T, NotificationRepositoryError>;

/// Notification inbox contract.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Returns up to `limit` notifications for the recipient, newest first.
    async fn list_for(
        &self,
        recipient: UserId,
        limit: usize,
    ) -> NotificationRepositoryResult<Vec<Notification>>;

    /// Finds a notification by identifier.
    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>>;

    /// Marks a notification read, returning it as stored.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::NotFound`] when it does not
    /// exist.
    async fn mark_read(&self, id: NotificationId) -> NotificationRepositoryResult<Notification>;

    /// Marks every unread notification of the recipient read, returning how
    /// many changed.
    async fn mark_all_read(&self, recipient: UserId) -> NotificationRepositoryResult<usize>;

    /// Removes a notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationRepositoryError::NotFound`] when it does not
    /// exist.
    async fn delete(&self, id: NotificationId) -> NotificationRepositoryResult<()>;
}

/// Errors returned by notification repository implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationRepositoryError {
    /// The notification was not found.
    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

//! Recipient-scoped notification inbox operations.

use crate::config::DEFAULT_NOTIFICATION_LIST_LIMIT;
use crate::error::ErrorKind;
use crate::notification::{
    domain::{Notification, NotificationId},
    ports::{NotificationRepository, NotificationRepositoryError},
};
use crate::project::domain::UserId;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for inbox operations.
#[derive(Debug, Error)]
pub enum NotificationServiceError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] NotificationRepositoryError),

    /// The notification does not exist or belongs to another user.
    #[error("notification not found: {0}")]
    NotFound(NotificationId),
}

impl NotificationServiceError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::Repository(NotificationRepositoryError::NotFound(_)) => {
                ErrorKind::NotFound
            }
            Self::Repository(NotificationRepositoryError::Persistence(_)) => ErrorKind::Persistence,
        }
    }
}

/// Result type for inbox operations.
pub type NotificationServiceResult<T> = Result<T, NotificationServiceError>;

/// Per-user notification inbox.
#[derive(Clone)]
pub struct NotificationService<R>
where
    R: NotificationRepository,
{
    repository: Arc<R>,
    list_limit: usize,
}

impl<R> NotificationService<R>
where
    R: NotificationRepository,
{
    /// Creates an inbox service returning at most 50 notifications per
    /// listing.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            list_limit: DEFAULT_NOTIFICATION_LIST_LIMIT,
        }
    }

    /// Overrides the listing cap.
    #[must_use]
    pub const fn with_list_limit(mut self, list_limit: usize) -> Self {
        self.list_limit = list_limit;
        self
    }

    /// Returns the recipient's most recent notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] when the lookup fails.
    pub async fn list_notifications(
        &self,
        recipient: UserId,
    ) -> NotificationServiceResult<Vec<Notification>> {
        Ok(self.repository.list_for(recipient, self.list_limit).await?)
    }

    /// Marks one of the recipient's notifications read.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::NotFound`] when it does not exist
    /// or belongs to someone else.
    pub async fn mark_read(
        &self,
        recipient: UserId,
        id: NotificationId,
    ) -> NotificationServiceResult<Notification> {
        self.owned(recipient, id).await?;
        Ok(self.repository.mark_read(id).await?)
    }

    /// Marks every unread notification of the recipient read.
    ///
    /// Returns how many notifications changed.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::Repository`] when the update fails.
    pub async fn mark_all_read(&self, recipient: UserId) -> NotificationServiceResult<usize> {
        Ok(self.repository.mark_all_read(recipient).await?)
    }

    /// Deletes one of the recipient's notifications.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationServiceError::NotFound`] when it does not exist
    /// or belongs to someone else.
    pub async fn delete_notification(
        &self,
        recipient: UserId,
        id: NotificationId,
    ) -> NotificationServiceResult<()> {
        self.owned(recipient, id).await?;
        Ok(self.repository.delete(id).await?)
    }

    async fn owned(
        &self,
        recipient: UserId,
        id: NotificationId,
    ) -> NotificationServiceResult<Notification> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|notification| notification.recipient() == recipient)
            .ok_or(NotificationServiceError::NotFound(id))
    }
}

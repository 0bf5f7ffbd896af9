//! In-memory store acting as both delivery target and inbox.

use async_trait::async_trait;
use std::cmp::Reverse;
use std::sync::{Arc, RwLock};

use crate::notification::{
    domain::{Notification, NotificationId},
    ports::{
        NotificationDelivery, NotificationDeliveryError, NotificationDeliveryResult,
        NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult,
    },
};
use crate::project::domain::UserId;

/// Thread-safe in-memory notification store.
///
/// Delivered notifications land in the recipient's inbox.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationStore {
    state: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotificationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationDelivery for InMemoryNotificationStore {
    async fn deliver(&self, notification: &Notification) -> NotificationDeliveryResult<()> {
        let mut notifications = self.state.write().map_err(|err| {
            NotificationDeliveryError::transport(std::io::Error::other(err.to_string()))
        })?;
        notifications.push(notification.clone());
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationStore {
    async fn list_for(
        &self,
        recipient: UserId,
        limit: usize,
    ) -> NotificationRepositoryResult<Vec<Notification>> {
        let notifications = self.state.read().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut inbox: Vec<Notification> = notifications
            .iter()
            .rev()
            .filter(|notification| notification.recipient() == recipient)
            .cloned()
            .collect();
        inbox.sort_by_key(|notification| Reverse(notification.created_at()));
        inbox.truncate(limit);
        Ok(inbox)
    }

    async fn find_by_id(
        &self,
        id: NotificationId,
    ) -> NotificationRepositoryResult<Option<Notification>> {
        let notifications = self.state.read().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(notifications
            .iter()
            .find(|notification| notification.id() == id)
            .cloned())
    }

    async fn mark_read(&self, id: NotificationId) -> NotificationRepositoryResult<Notification> {
        let mut notifications = self.state.write().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let notification = notifications
            .iter_mut()
            .find(|notification| notification.id() == id)
            .ok_or(NotificationRepositoryError::NotFound(id))?;
        notification.mark_read();
        Ok(notification.clone())
    }

    async fn mark_all_read(&self, recipient: UserId) -> NotificationRepositoryResult<usize> {
        let mut notifications = self.state.write().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(notifications
            .iter_mut()
            .filter(|notification| notification.recipient() == recipient)
            .filter_map(|notification| notification.mark_read().then_some(()))
            .count())
    }

    async fn delete(&self, id: NotificationId) -> NotificationRepositoryResult<()> {
        let mut notifications = self.state.write().map_err(|err| {
            NotificationRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let before = notifications.len();
        notifications.retain(|notification| notification.id() != id);
        if notifications.len() == before {
            return Err(NotificationRepositoryError::NotFound(id));
        }
        Ok(())
    }
}

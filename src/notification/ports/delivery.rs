//! Notification delivery collaborator port.

use crate::notification::domain::Notification;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification delivery.
pub type NotificationDeliveryResult<T> = Result<T, NotificationDeliveryError>;

/// Accepts notifications for delivery to their recipient.
#[async_trait]
pub trait NotificationDelivery: Send + Sync {
    /// Delivers one notification.
    async fn deliver(&self, notification: &Notification) -> NotificationDeliveryResult<()>;
}

/// Errors returned by notification delivery implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationDeliveryError {
    /// The recipient cannot receive notifications.
    #[error("recipient rejected the notification: {0}")]
    Rejected(String),

    /// Transport or persistence failure.
    #[error("delivery failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationDeliveryError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}

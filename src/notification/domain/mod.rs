//! Domain model for notifications.

mod notification;

pub use notification::{Notification, NotificationId, NotificationKind};

//! Application services for the notification inbox.

mod inbox;

pub use inbox::{NotificationService, NotificationServiceError, NotificationServiceResult};

//! Port definitions for notification delivery and storage.

mod delivery;
mod repository;

pub use delivery::{NotificationDelivery, NotificationDeliveryError, NotificationDeliveryResult};
pub use repository::{
    NotificationRepository, NotificationRepositoryError, NotificationRepositoryResult,
};

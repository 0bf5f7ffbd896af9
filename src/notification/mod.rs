//! Notification records, delivery, and the per-user inbox.
//!
//! Automations hand notifications to a [`ports::NotificationDelivery`]
//! collaborator; the in-memory adapter doubles as the inbox store that the
//! [`services::NotificationService`] reads from.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

//! In-memory notification inbox.

mod store;

pub use store::InMemoryNotificationStore;

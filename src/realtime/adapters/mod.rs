//! Adapter implementations for event publication.

mod recording;
mod subscription;

pub use recording::RecordingDispatcher;
pub use subscription::{RealtimeDispatcher, SubscriptionError, SubscriptionRegistry};

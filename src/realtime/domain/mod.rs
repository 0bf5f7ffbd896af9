//! Wire-level types for real-time delivery.

mod connection;
mod message;

pub use connection::{ConnectionId, RoomKey};
pub use message::{EventName, RealtimeMessage};

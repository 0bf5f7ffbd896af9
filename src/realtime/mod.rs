//! Real-time distribution of committed domain events.
//!
//! Components that commit state receive an explicitly injected
//! [`ports::EventDispatcher`]. The production adapter translates each
//! [`crate::event::DomainEvent`] into a named wire message and fans it out
//! to every connection subscribed to the event's project room.

pub mod adapters;
pub mod domain;
pub mod ports;

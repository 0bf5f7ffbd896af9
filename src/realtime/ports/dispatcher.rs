//! Event dispatcher port.

use crate::event::DomainEvent;

/// Publishes committed domain events to interested observers.
///
/// Implementations must not block and must not fail the caller: delivery is
/// best-effort to currently connected observers. Callers publish while
/// holding the project's write lock, so calls for one project arrive in
/// commit order.
pub trait EventDispatcher: Send + Sync {
    /// Publishes one committed event.
    fn publish(&self, event: &DomainEvent);
}

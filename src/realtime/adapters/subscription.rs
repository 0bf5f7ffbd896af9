//! Subscription registry and the dispatcher that fans events out to it.

use crate::event::DomainEvent;
use crate::project::domain::ProjectId;
use crate::realtime::{
    domain::{ConnectionId, RealtimeMessage},
    ports::EventDispatcher,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Errors returned by subscription management.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The connection was never opened or has been closed.
    #[error("unknown connection: {0}")]
    UnknownConnection(ConnectionId),
}

#[derive(Debug, Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, UnboundedSender<RealtimeMessage>>,
    rooms: HashMap<ProjectId, HashSet<ConnectionId>>,
}

impl RegistryState {
    fn drop_connection(&mut self, connection: ConnectionId) {
        self.connections.remove(&connection);
        self.rooms.retain(|_, members| {
            members.remove(&connection);
            !members.is_empty()
        });
    }
}

/// Tracks which live connections watch which projects.
///
/// Each connection owns an unbounded channel, so a slow reader never blocks
/// a publisher. Subscribing never replays past events.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    state: RwLock<RegistryState>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a connection and returns the receiving end of its channel.
    #[must_use]
    pub fn connect(&self) -> (ConnectionId, UnboundedReceiver<RealtimeMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let connection = ConnectionId::new();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.connections.insert(connection, sender);
        debug!(connection_id = %connection, "connection opened");
        (connection, receiver)
    }

    /// Adds a connection to a project's room.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError::UnknownConnection`] when the connection
    /// is not open.
    pub fn subscribe(
        &self,
        connection: ConnectionId,
        project_id: ProjectId,
    ) -> Result<(), SubscriptionError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.connections.contains_key(&connection) {
            return Err(SubscriptionError::UnknownConnection(connection));
        }
        state.rooms.entry(project_id).or_default().insert(connection);
        debug!(connection_id = %connection, project_id = %project_id, "subscribed");
        Ok(())
    }

    /// Removes a connection from a project's room.
    ///
    /// Unsubscribing from a room the connection is not in is a no-op.
    pub fn unsubscribe(&self, connection: ConnectionId, project_id: ProjectId) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(members) = state.rooms.get_mut(&project_id) {
            members.remove(&connection);
            if members.is_empty() {
                state.rooms.remove(&project_id);
            }
        }
        debug!(connection_id = %connection, project_id = %project_id, "unsubscribed");
    }

    /// Closes a connection and removes it from every room.
    pub fn disconnect(&self, connection: ConnectionId) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.drop_connection(connection);
        debug!(connection_id = %connection, "connection closed");
    }

    /// Returns the number of connections subscribed to a project.
    #[must_use]
    pub fn subscriber_count(&self, project_id: ProjectId) -> usize {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.rooms.get(&project_id).map_or(0, HashSet::len)
    }

    /// Sends a message to every connection subscribed to the project.
    ///
    /// Connections whose receiver has been dropped are closed. Returns the
    /// number of connections the message was delivered to.
    #[must_use]
    pub fn fan_out(&self, project_id: ProjectId, message: &RealtimeMessage) -> usize {
        let (subscribed, closed) = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            let Some(members) = state.rooms.get(&project_id) else {
                return 0;
            };
            let stale: Vec<ConnectionId> = members
                .iter()
                .filter(|connection| {
                    state
                        .connections
                        .get(connection)
                        .is_none_or(|sender| sender.send(message.clone()).is_err())
                })
                .copied()
                .collect();
            (members.len(), stale)
        };

        let delivered = subscribed.saturating_sub(closed.len());
        if !closed.is_empty() {
            let mut writable = self.state.write().unwrap_or_else(PoisonError::into_inner);
            for dropped in &closed {
                writable.drop_connection(*dropped);
                debug!(connection_id = %dropped, "dropped closed connection");
            }
        }
        delivered
    }
}

/// Dispatcher that delivers events to a [`SubscriptionRegistry`].
#[derive(Debug, Clone)]
pub struct RealtimeDispatcher {
    registry: Arc<SubscriptionRegistry>,
}

impl RealtimeDispatcher {
    /// Creates a dispatcher over the given registry.
    #[must_use]
    pub const fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry events are delivered to.
    #[must_use]
    pub const fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }
}

impl EventDispatcher for RealtimeDispatcher {
    fn publish(&self, event: &DomainEvent) {
        let message = match RealtimeMessage::from_event(event) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(project_id = %event.project_id(), error = %err, "failed to encode event");
                return;
            }
        };
        let delivered = self.registry.fan_out(event.project_id(), &message);
        debug!(
            project_id = %event.project_id(),
            event = %message.event(),
            delivered,
            "event published"
        );
    }
}

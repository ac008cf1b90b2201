//! Connection tracking and fan-out to the two audiences.
//!
//! Every socket gets an unbounded outbox drained by its own writer task, so
//! sending never waits on the network.

use crate::games::skirmish::Side;
use crate::protocol::ServerMessage;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("conn-{_0}")]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next identifier.
    pub fn next() -> Self {
        Self(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed))
    }
}

/// Audience a connection was classified into when it connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Role {
    /// May submit moves.
    #[display("player")]
    Player,
    /// Read-only observer.
    #[display("spectator")]
    Spectator,
}

/// Recipients of a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Player connections only.
    Players,
    /// Spectator connections only.
    Spectators,
    /// Every connection.
    Everyone,
}

impl Audience {
    /// Whether a connection with `role` receives this broadcast.
    pub fn includes(self, role: Role) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::Players => role == Role::Player,
            Audience::Spectators => role == Role::Spectator,
        }
    }
}

#[derive(Debug, derive_new::new)]
struct Connection {
    role: Role,
    outbox: UnboundedSender<String>,
    #[new(default)]
    declared_side: Option<Side>,
}

/// Shared table of open connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<Mutex<HashMap<ConnectionId, Connection>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection; its role never changes afterwards.
    #[instrument(skip(self, outbox))]
    pub async fn register(&self, role: Role, outbox: UnboundedSender<String>) -> ConnectionId {
        let id = ConnectionId::next();
        let mut connections = self.connections.lock().await;
        connections.insert(id, Connection::new(role, outbox));
        info!(connection = %id, %role, open = connections.len(), "Connection registered");
        id
    }

    /// Drops a connection from its audience.
    #[instrument(skip(self))]
    pub async fn deregister(&self, id: ConnectionId) {
        let mut connections = self.connections.lock().await;
        if connections.remove(&id).is_some() {
            info!(connection = %id, open = connections.len(), "Connection closed");
        }
    }

    /// Role of a connection, if it is still open.
    pub async fn role_of(&self, id: ConnectionId) -> Option<Role> {
        self.connections.lock().await.get(&id).map(|c| c.role)
    }

    /// Records the side a connection says it plays.
    ///
    /// Informational only: moves are authorized by the side they carry, and
    /// a mismatch with the declared side is merely logged.
    #[instrument(skip(self))]
    pub async fn declare_side(&self, id: ConnectionId, side: Side) {
        if let Some(connection) = self.connections.lock().await.get_mut(&id) {
            connection.declared_side = Some(side);
            debug!(connection = %id, %side, "Side declared");
        }
    }

    /// Side a connection declared with `init`, if any. Never consulted for
    /// authorization.
    pub async fn declared_side(&self, id: ConnectionId) -> Option<Side> {
        self.connections
            .lock()
            .await
            .get(&id)
            .and_then(|c| c.declared_side)
    }

    /// Sends a message to every connection in `audience`.
    ///
    /// The message is serialized once. Returns how many outboxes accepted it.
    #[instrument(skip(self, message))]
    pub async fn broadcast(&self, audience: Audience, message: &ServerMessage) -> usize {
        let Some(text) = encode(message) else {
            return 0;
        };
        let connections = self.connections.lock().await;
        let delivered = connections
            .iter()
            .filter(|(_, c)| audience.includes(c.role))
            .filter(|(id, c)| push(**id, &c.outbox, text.clone()))
            .count();
        debug!(delivered, "Broadcast sent");
        delivered
    }

    /// Sends a message to one connection. Returns whether it was queued.
    #[instrument(skip(self, message))]
    pub async fn unicast(&self, id: ConnectionId, message: &ServerMessage) -> bool {
        let Some(text) = encode(message) else {
            return false;
        };
        match self.connections.lock().await.get(&id) {
            Some(connection) => push(id, &connection.outbox, text),
            None => {
                debug!(connection = %id, "Unicast to unknown connection");
                false
            }
        }
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    serde_json::to_string(message)
        .inspect_err(|e| warn!(error = %e, "Failed to encode server message"))
        .ok()
}

/// Queues text on an outbox. A closed outbox means the writer task is gone
/// and the reader will deregister the connection shortly.
fn push(id: ConnectionId, outbox: &UnboundedSender<String>, text: String) -> bool {
    match outbox.send(text) {
        Ok(()) => true,
        Err(_) => {
            debug!(connection = %id, "Outbox closed, dropping message");
            false
        }
    }
}

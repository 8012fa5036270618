//! Client registry
//!
//! Tracks connected listeners and fans byte windows out to them. Each
//! listener owns a bounded queue; a write never waits on a slow listener.

use crate::error::ClientWriteFailure;
use bytes::Bytes;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Opaque listener identifier, unique for the life of the station
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a raw identifier
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Sending half of one listener's byte queue
#[derive(Debug)]
pub struct ClientConnection {
    id: ListenerId,
    sink: mpsc::Sender<Bytes>,
    alive: bool,
    bytes_written: u64,
}

impl ClientConnection {
    /// Wrap a listener queue
    pub fn new(id: ListenerId, sink: mpsc::Sender<Bytes>) -> Self {
        Self {
            id,
            sink,
            alive: true,
            bytes_written: 0,
        }
    }

    /// Listener identifier
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// False once a write has failed
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Total bytes queued for this listener
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Queue `bytes` without waiting
    ///
    /// Empty windows are skipped. Any failure marks the connection dead.
    ///
    /// # Errors
    /// `Lagging` when the queue is full, `Disconnected` when the receiver is gone
    pub fn try_write(&mut self, bytes: &Bytes) -> Result<(), ClientWriteFailure> {
        if !self.alive {
            return Err(ClientWriteFailure::Disconnected);
        }
        if bytes.is_empty() {
            return Ok(());
        }

        match self.sink.try_send(bytes.clone()) {
            Ok(()) => {
                self.bytes_written += bytes.len() as u64;
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                self.alive = false;
                Err(ClientWriteFailure::Lagging)
            }
            Err(TrySendError::Closed(_)) => {
                self.alive = false;
                Err(ClientWriteFailure::Disconnected)
            }
        }
    }
}

/// Set of live listeners
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: BTreeMap<ListenerId, ClientConnection>,
}

impl ClientRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn add(&mut self, connection: ClientConnection) {
        self.clients.insert(connection.id(), connection);
    }

    /// Unregister a listener; removing an unknown id is a no-op
    pub fn remove(&mut self, id: ListenerId) -> Option<ClientConnection> {
        self.clients.remove(&id)
    }

    /// Check whether a listener is registered
    pub fn contains(&self, id: ListenerId) -> bool {
        self.clients.contains_key(&id)
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Check if nobody is listening
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Write `bytes` to every listener
    ///
    /// Listeners whose write fails are removed after the pass and returned
    /// with the reason. The window reaches every other listener regardless.
    pub fn broadcast(&mut self, bytes: &Bytes) -> Vec<(ListenerId, ClientWriteFailure)> {
        if bytes.is_empty() {
            return Vec::new();
        }

        let failed: Vec<(ListenerId, ClientWriteFailure)> = self
            .clients
            .values_mut()
            .filter_map(|client| client.try_write(bytes).err().map(|e| (client.id(), e)))
            .collect();

        for (id, _) in &failed {
            self.clients.remove(id);
        }

        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(id: u64, capacity: usize) -> (ClientConnection, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        (ClientConnection::new(ListenerId::new(id), tx), rx)
    }

    #[test]
    fn broadcast_reaches_every_listener() {
        let mut registry = ClientRegistry::new();
        let (a, mut rx_a) = connection(1, 8);
        let (b, mut rx_b) = connection(2, 8);
        registry.add(a);
        registry.add(b);

        let failed = registry.broadcast(&Bytes::from_static(b"hello"));
        assert!(failed.is_empty());
        assert_eq!(rx_a.try_recv().unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(rx_b.try_recv().unwrap(), Bytes::from_static(b"hello"));
    }

    #[test]
    fn full_queue_drops_only_that_listener() {
        let mut registry = ClientRegistry::new();
        let (slow, _rx_slow) = connection(1, 1);
        let (fast, mut rx_fast) = connection(2, 8);
        registry.add(slow);
        registry.add(fast);

        assert!(registry.broadcast(&Bytes::from_static(b"one")).is_empty());
        let failed = registry.broadcast(&Bytes::from_static(b"two"));

        assert_eq!(failed, vec![(ListenerId::new(1), ClientWriteFailure::Lagging)]);
        assert!(!registry.contains(ListenerId::new(1)));
        assert_eq!(registry.len(), 1);
        assert_eq!(rx_fast.try_recv().unwrap(), Bytes::from_static(b"one"));
        assert_eq!(rx_fast.try_recv().unwrap(), Bytes::from_static(b"two"));
    }

    #[test]
    fn closed_receiver_is_disconnected() {
        let mut registry = ClientRegistry::new();
        let (gone, rx) = connection(7, 8);
        registry.add(gone);
        drop(rx);

        let failed = registry.broadcast(&Bytes::from_static(b"x"));
        assert_eq!(failed, vec![(ListenerId::new(7), ClientWriteFailure::Disconnected)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut registry = ClientRegistry::new();
        let (a, _rx) = connection(1, 8);
        registry.add(a);

        assert!(registry.remove(ListenerId::new(1)).is_some());
        assert!(registry.remove(ListenerId::new(1)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn empty_window_is_not_queued() {
        let (mut conn, mut rx) = connection(1, 1);
        conn.try_write(&Bytes::new()).unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(conn.bytes_written(), 0);

        conn.try_write(&Bytes::from_static(b"abc")).unwrap();
        assert_eq!(conn.bytes_written(), 3);
        assert!(conn.is_alive());
    }
}

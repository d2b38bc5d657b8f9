//! Connection registry — the process-wide map of live station sockets
//!
//! Explicitly constructed and injected (one per server instance) so tests can
//! run isolated registries. DashMap gives per-entry synchronization; no lock
//! is held across socket I/O.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::connection::Connection;

pub struct ConnectionRegistry {
    connections: DashMap<String, Connection>,
    next_connection_id: AtomicU64,
}

pub type SharedConnectionRegistry = Arc<ConnectionRegistry>;

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_connection_id: AtomicU64::new(1),
        }
    }

    pub fn shared() -> SharedConnectionRegistry {
        Arc::new(Self::new())
    }

    /// Register a station socket, superseding any prior entry
    /// (last-connection-wins; the old socket is not force-closed here).
    /// Returns the connection id to hand back to [`unregister`].
    pub fn register(&self, station_id: &str, sender: mpsc::UnboundedSender<String>) -> u64 {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let previous = self.connections.insert(
            station_id.to_string(),
            Connection::new(connection_id, station_id, sender),
        );
        if previous.is_some() {
            warn!(station_id, "Superseding existing connection for station");
        } else {
            info!(station_id, "Registered station connection");
        }
        connection_id
    }

    /// Remove the entry for `station_id` if it still belongs to
    /// `connection_id`. Returns false when a newer connection already
    /// replaced it (the caller must then skip its disconnect bookkeeping).
    pub fn unregister(&self, station_id: &str, connection_id: u64) -> bool {
        let removed = self
            .connections
            .remove_if(station_id, |_, conn| conn.connection_id == connection_id)
            .is_some();
        if removed {
            info!(station_id, "Unregistered station connection");
        }
        removed
    }

    /// Write a raw frame to a station's socket, if one is open.
    pub fn send_to(&self, station_id: &str, message: String) -> Result<(), String> {
        match self.connections.get(station_id) {
            Some(conn) => conn.send(message),
            None => Err(format!("station {} not connected", station_id)),
        }
    }

    pub fn is_connected(&self, station_id: &str) -> bool {
        self.connections.contains_key(station_id)
    }

    pub fn connected_ids(&self) -> Vec<String> {
        self.connections.iter().map(|r| r.key().clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> (
        mpsc::UnboundedSender<String>,
        mpsc::UnboundedReceiver<String>,
    ) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn register_lookup_unregister() {
        let reg = ConnectionRegistry::new();
        let (tx, mut rx) = channel();
        let conn_id = reg.register("ST-001", tx);

        assert!(reg.is_connected("ST-001"));
        reg.send_to("ST-001", "hello".into()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), "hello");

        assert!(reg.unregister("ST-001", conn_id));
        assert!(!reg.is_connected("ST-001"));
    }

    #[test]
    fn send_to_unknown_station_errors() {
        let reg = ConnectionRegistry::new();
        assert!(reg.send_to("nope", "x".into()).is_err());
    }

    #[test]
    fn reconnect_supersedes_previous_entry() {
        let reg = ConnectionRegistry::new();
        let (tx1, _rx1) = channel();
        let (tx2, mut rx2) = channel();

        let first = reg.register("ST-001", tx1);
        let second = reg.register("ST-001", tx2);
        assert_ne!(first, second);
        assert_eq!(reg.count(), 1);

        // Traffic goes to the newest socket.
        reg.send_to("ST-001", "ping".into()).unwrap();
        assert_eq!(rx2.try_recv().unwrap(), "ping");

        // Stale cleanup must not evict the new entry.
        assert!(!reg.unregister("ST-001", first));
        assert!(reg.is_connected("ST-001"));

        assert!(reg.unregister("ST-001", second));
        assert!(!reg.is_connected("ST-001"));
    }

    #[tokio::test]
    async fn concurrent_registers_do_not_collide() {
        let reg = ConnectionRegistry::shared();
        let mut tasks = Vec::new();
        for i in 0..32 {
            let reg = reg.clone();
            tasks.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::unbounded_channel();
                reg.register(&format!("ST-{i:03}"), tx)
            }));
        }
        let mut ids = Vec::new();
        for t in tasks {
            ids.push(t.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 32);
        assert_eq!(reg.count(), 32);
    }
}

//! Connection registry and best-effort event fan-out.
//!
//! The registry owns connection membership exclusively; nothing else adds
//! or removes connections. Delivery is at-most-once per event per
//! connection: [`Broadcaster::publish`] iterates a point-in-time snapshot
//! of the registry, so a connection registered mid-publish does not receive
//! that event, and a connection whose channel is gone is unregistered as a
//! side effect of the failed send. Publish never blocks on a slow consumer
//! and never retries.
//!
//! Per-connection ordering is FIFO because each connection has its own
//! unbounded channel; cross-connection ordering is unconstrained.

use crate::domain::PacketEvent;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Events are shared across connections instead of cloned; `details` is
/// unbounded in the worst case.
pub type SharedEvent = Arc<PacketEvent>;

/// Opaque handle identifying one registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

/// Thread-safe registry of live viewer connections.
#[derive(Debug, Default)]
pub struct Broadcaster {
    next_id: AtomicU64,
    connections: Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<SharedEvent>>>,
}

impl Broadcaster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a viewer. Returns its handle and the receiving end of its
    /// event stream. Ids are never reused, so the registry cannot hold a
    /// duplicate handle.
    pub fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<SharedEvent>) {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut connections) = self.connections.lock() {
            connections.insert(id, tx);
        }
        debug!("connection {id:?} registered");
        (id, rx)
    }

    /// Remove a viewer. Idempotent: removing an absent handle is a no-op.
    pub fn unregister(&self, id: ConnectionId) {
        if let Ok(mut connections) = self.connections.lock() {
            if connections.remove(&id).is_some() {
                debug!("connection {id:?} unregistered");
            }
        }
    }

    /// Deliver `event` to every connection registered at the time of the
    /// call. Failed deliveries unregister the connection; nothing is
    /// surfaced to the caller.
    pub fn publish(&self, event: SharedEvent) {
        // Snapshot under a short lock hold, send outside it. Connections
        // registered after this point miss this event by design.
        let snapshot: Vec<(ConnectionId, mpsc::UnboundedSender<SharedEvent>)> =
            match self.connections.lock() {
                Ok(connections) => connections
                    .iter()
                    .map(|(id, tx)| (*id, tx.clone()))
                    .collect(),
                Err(_) => return,
            };

        let mut dead = Vec::new();
        for (id, tx) in snapshot {
            if tx.send(Arc::clone(&event)).is_err() {
                dead.push(id);
            }
        }
        for id in dead {
            debug!("connection {id:?} dropped during delivery");
            self.unregister(id);
        }
    }

    /// Number of currently registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().map_or(0, |connections| connections.len())
    }
}

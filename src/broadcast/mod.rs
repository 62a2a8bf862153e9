// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Sensor Broadcast
//!
//! Fans mat sensor readings out to every connected client.
//!
//! Each client connection registers with the [`ConnectionRegistry`] and gets
//! back a channel receiver; the connection's transport task forwards whatever
//! arrives on it. Delivery is best effort: a full or closed channel is logged
//! and skipped, and the remaining connections still receive the reading. A
//! closed channel is also unregistered.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-connection buffer. Readings beyond this are dropped for that connection.
pub const CONNECTION_CHANNEL_BUFFER: usize = 32;

pub type ConnectionId = Uuid;

/// One frame of mat sensor data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SensorReading {
    /// Pressure per sensor cell
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub pressures: Vec<Value>,
    /// LED colour per cell
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub colors: Vec<Value>,
}

/// Delivery counts for one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Currently connected clients.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<ConnectionId, mpsc::Sender<String>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection with the default buffer.
    pub fn register(&self) -> (ConnectionId, mpsc::Receiver<String>) {
        self.register_with_buffer(CONNECTION_CHANNEL_BUFFER)
    }

    pub fn register_with_buffer(&self, buffer: usize) -> (ConnectionId, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let id = Uuid::new_v4();
        match self.connections.write() {
            Ok(mut connections) => {
                connections.insert(id, sender);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(id, sender);
            }
        }
        debug!(connection_id = %id, "Registered connection");
        (id, receiver)
    }

    /// Remove a connection. Returns whether it was registered.
    pub fn unregister(&self, id: &ConnectionId) -> bool {
        let removed = match self.connections.write() {
            Ok(mut connections) => connections.remove(id),
            Err(poisoned) => poisoned.into_inner().remove(id),
        };
        removed.is_some()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.snapshot().into_iter().map(|(id, _)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<(ConnectionId, mpsc::Sender<String>)> {
        let copy = |map: &HashMap<ConnectionId, mpsc::Sender<String>>| -> Vec<_> {
            map.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };
        match self.connections.read() {
            Ok(connections) => copy(&*connections),
            Err(poisoned) => copy(&*poisoned.into_inner()),
        }
    }
}

/// Sends readings to every registered connection.
#[derive(Clone, Default)]
pub struct Broadcaster {
    registry: ConnectionRegistry,
}

impl Broadcaster {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Deliver `reading` to every connection registered right now.
    pub fn broadcast(&self, reading: &SensorReading) -> BroadcastReport {
        let payload = match serde_json::to_string(reading) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize sensor reading");
                return BroadcastReport {
                    delivered: 0,
                    failed: self.registry.len(),
                };
            }
        };

        let mut report = BroadcastReport::default();
        for (id, sender) in self.registry.snapshot() {
            match sender.try_send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Closed(_)) => {
                    warn!(connection_id = %id, "Connection closed, unregistering");
                    self.registry.unregister(&id);
                    report.failed += 1;
                }
                Err(e) => {
                    warn!(connection_id = %id, error = %e, "Failed to send reading to connection");
                    report.failed += 1;
                }
            }
        }

        debug!(
            delivered = report.delivered,
            failed = report.failed,
            "Broadcast sensor reading"
        );
        report
    }
}

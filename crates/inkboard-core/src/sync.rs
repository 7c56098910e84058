//! Cross-instance state replication.
//!
//! Every local change publishes a full [`CanvasState`] snapshot tagged with the sender's
//! origin id. Receivers drop their own messages and apply everything else as an atomic
//! replace (last writer wins, no merging).

use crate::canvas::CanvasState;
use crate::error::CanvasResult;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Snapshot broadcast between instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMessage {
    pub origin_id: String,
    pub state: CanvasState,
}

impl SyncMessage {
    pub fn to_json(&self) -> CanvasResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> CanvasResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A pub/sub channel shared by several board instances.
pub trait SyncChannel {
    /// Identifier stamped on messages this endpoint publishes.
    fn origin_id(&self) -> &str;

    fn publish(&self, message: &SyncMessage) -> CanvasResult<()>;

    /// Drain pending messages without blocking.
    fn poll(&self) -> Vec<SyncMessage>;
}

/// In-process broadcast channel. Every published message reaches every other endpoint.
///
/// Endpoints queue messages until polled, so a joined endpoint must be polled (or dropped)
/// to keep its queue bounded.
#[derive(Debug, Clone, Default)]
pub struct BroadcastHub {
    peers: Arc<Mutex<Vec<Peer>>>,
}

#[derive(Debug)]
struct Peer {
    origin_id: String,
    sender: Sender<String>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new endpoint with a fresh origin id.
    pub fn join(&self) -> BroadcastEndpoint {
        let (tx, rx) = channel();
        let origin_id = Uuid::new_v4().to_string();
        self.peers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Peer {
                origin_id: origin_id.clone(),
                sender: tx,
            });
        log::debug!("Endpoint {origin_id} joined broadcast hub");
        BroadcastEndpoint {
            origin_id,
            hub: self.clone(),
            receiver: rx,
        }
    }

    /// Number of live endpoints.
    pub fn peer_count(&self) -> usize {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn broadcast(&self, from: &str, payload: &str) {
        let mut peers = self.peers.lock().unwrap_or_else(PoisonError::into_inner);
        // Dropped endpoints show up as send errors.
        peers.retain(|peer| peer.origin_id == from || peer.sender.send(payload.to_string()).is_ok());
    }
}

/// One participant of a [`BroadcastHub`].
#[derive(Debug)]
pub struct BroadcastEndpoint {
    origin_id: String,
    hub: BroadcastHub,
    receiver: Receiver<String>,
}

impl SyncChannel for BroadcastEndpoint {
    fn origin_id(&self) -> &str {
        &self.origin_id
    }

    fn publish(&self, message: &SyncMessage) -> CanvasResult<()> {
        let payload = message.to_json()?;
        self.hub.broadcast(&self.origin_id, &payload);
        Ok(())
    }

    fn poll(&self) -> Vec<SyncMessage> {
        let mut messages = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(payload) => match SyncMessage::from_json(&payload) {
                    Ok(message) => messages.push(message),
                    Err(e) => log::warn!("Dropping malformed sync message: {e}"),
                },
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        messages
    }
}

//! Outward notifications
//!
//! The soundscape can publish what happened during a tick on an [`EventBus`]
//! so a UI (or a recorder, or a test) can follow along without polling the
//! `TickReport`. Publishing from the tick never blocks: when the bus is full
//! the event is dropped.

use crossbeam::channel::{self, Receiver, Sender, TrySendError};

use crate::engine::NodeMix;
use crate::loader::AssetResolved;
use crate::types::NodeId;

/// Events broadcast by a `Soundscape`
#[derive(Debug, Clone, PartialEq)]
pub enum SoundscapeEvent {
    /// Per-node mix result of a tick
    VolumeChanged(NodeMix),
    /// A background sound load finished
    AssetResolved(AssetResolved),
    NodeAdded { id: NodeId, file_path: String },
    NodeRemoved { id: NodeId },
    /// A map replaced the current node set
    MapLoaded { node_count: usize },
}

/// Bounded multi-consumer event channel
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<SoundscapeEvent>,
    receiver: Receiver<SoundscapeEvent>,
}

impl EventBus {
    /// Create a new event bus with bounded capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = channel::bounded(capacity);
        Self { sender, receiver }
    }

    /// Receiver for consuming events; clones share one queue
    pub fn subscribe(&self) -> Receiver<SoundscapeEvent> {
        self.receiver.clone()
    }

    /// Publish without blocking; returns `false` if the event was dropped
    pub fn try_publish(&self, event: SoundscapeEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::trace!("EventBus: full, dropping event");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bus() {
        let bus = EventBus::new(16);
        let rx = bus.subscribe();

        assert!(bus.try_publish(SoundscapeEvent::NodeRemoved { id: NodeId(4) }));

        match rx.recv().unwrap() {
            SoundscapeEvent::NodeRemoved { id } => assert_eq!(id, NodeId(4)),
            other => panic!("Wrong event type: {:?}", other),
        }
    }

    #[test]
    fn test_try_publish_drops_when_full() {
        let bus = EventBus::new(1);
        assert!(bus.try_publish(SoundscapeEvent::MapLoaded { node_count: 0 }));
        assert!(!bus.try_publish(SoundscapeEvent::MapLoaded { node_count: 1 }));
        assert_eq!(bus.subscribe().len(), 1);
    }
}

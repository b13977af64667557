//! Registry event types and the subscriber fan-out.
//!
//! Every registry mutation emits one `RegistryEvent`. Events are
//! serializable so a frontend can forward them as JSON.

use std::sync::{Arc, mpsc};

use serde::{Deserialize, Serialize};

use crate::core::thread::ThreadId;

/// Events emitted by the registry after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A root or branch thread was created.
    ThreadCreated {
        id: ThreadId,
        parent_id: Option<ThreadId>,
    },

    /// A message was appended at `index`.
    MessageAppended { id: ThreadId, index: usize },

    /// The branch note was set or cleared.
    BranchNoteChanged { id: ThreadId },

    /// The thread was removed; its children were re-parented.
    ThreadDeleted { id: ThreadId },

    /// The active-thread pointer moved.
    ///
    /// Emitted on every successful switch, including re-selecting the
    /// thread that is already active.
    ActiveThreadChanged {
        previous: Option<ThreadId>,
        current: Option<ThreadId>,
    },
}

/// Channel-based event sender (sync, unbounded).
///
/// Events are wrapped in `Arc` so one emit can reach many subscribers
/// without cloning the payload.
pub type RegistryEventTx = mpsc::Sender<Arc<RegistryEvent>>;

/// Channel-based event receiver (sync, unbounded).
pub type RegistryEventRx = mpsc::Receiver<Arc<RegistryEvent>>;

/// Creates an unbounded event channel.
pub fn create_event_channel() -> (RegistryEventTx, RegistryEventRx) {
    mpsc::channel()
}

/// Distributes events to every live subscriber.
///
/// Sends never block. Subscribers whose receiver was dropped are removed on
/// the next broadcast.
#[derive(Debug, Default)]
pub struct Broadcaster {
    subscribers: Vec<RegistryEventTx>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and returns its receiver.
    pub fn subscribe(&mut self) -> RegistryEventRx {
        let (tx, rx) = create_event_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Sends `event` to every subscriber, pruning closed channels.
    pub fn broadcast(&mut self, event: RegistryEvent) {
        let event = Arc::new(event);
        self.subscribers
            .retain(|tx| tx.send(Arc::clone(&event)).is_ok());
    }

    /// Number of subscribers still registered (closed ones are pruned lazily).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

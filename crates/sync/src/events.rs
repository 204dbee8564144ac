//! Session events broadcast by the sync store.
//!
//! Backed by a `tokio::sync::broadcast` channel so any number of views
//! can independently observe session-level state changes.

use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// A session-level event emitted by the store.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The held credential was rejected; both tokens have been cleared.
    SessionExpired {
        /// Display-ready message for the user.
        detail: String,
    },

    /// Navigation to the login entry point should happen now.
    /// Published at most once per store lifetime, a short fixed delay
    /// after the first authentication failure.
    RedirectToLogin,
}

/// Broadcast hub for [`StoreEvent`]s.
#[derive(Clone)]
pub struct StoreEvents {
    sender: broadcast::Sender<StoreEvent>,
}

impl StoreEvents {
    /// Create a hub with a specific channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all events published from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: StoreEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }
}

impl Default for StoreEvents {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

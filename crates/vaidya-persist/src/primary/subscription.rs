//! Change notifications for the primary store.
//!
//! A handle never sees its own writes, only those made by other handles on
//! the same backend. Concurrent writers resolve as last-writer-wins.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 64;

/// A key changed; `new_value` is the raw stored text, `None` after removal.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
    pub origin: Uuid,
}

#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<StorageEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: StorageEvent) {
        // No subscribers is the common case.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self, own_handle: Uuid) -> StorageSubscription {
        StorageSubscription {
            receiver: self.sender.subscribe(),
            own_handle,
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Registered interest in changes made elsewhere. Dropping it unsubscribes.
#[derive(Debug)]
pub struct StorageSubscription {
    receiver: broadcast::Receiver<StorageEvent>,
    own_handle: Uuid,
}

impl StorageSubscription {
    /// Waits for the next foreign change; `None` once the backend is gone.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.origin == self.own_handle => continue,
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "storage subscriber lagged; older changes dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.origin == self.own_handle => continue,
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "storage subscriber lagged; older changes dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

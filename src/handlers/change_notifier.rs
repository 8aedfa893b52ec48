use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::models::{ChangeEvent, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription-{}", self.0)
    }
}

struct Subscriber {
    target: Target,
    sender: UnboundedSender<ChangeEvent>,
}

/// Handle returned by [`ChangeNotifier::subscribe`]; receives change events
/// for the target it was registered on.
pub struct Subscription {
    id: SubscriptionId,
    target: Target,
    receiver: UnboundedReceiver<ChangeEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Wait for the next event. Returns `None` once unsubscribed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }

    /// Take the next pending event without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.try_recv().ok()
    }
}

/// Registry of observers interested in inventory changes.
pub struct ChangeNotifier {
    subscribers: Arc<RwLock<HashMap<SubscriptionId, Subscriber>>>,
    next_id: AtomicU64,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn subscribe(&self, target: Target) -> Subscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(id, Subscriber { target, sender });
        tracing::debug!("{} registered on {}", id, target);

        Subscription {
            id,
            target,
            receiver,
        }
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), SubscriptionError> {
        let mut subscribers = self.subscribers.write().await;
        if subscribers.remove(&id).is_some() {
            tracing::debug!("{} removed", id);
            Ok(())
        } else {
            Err(SubscriptionError::NotFound(id))
        }
    }

    /// Deliver `event` to every subscriber observing its target.
    ///
    /// Sending never blocks. Subscribers whose handle was dropped are removed.
    pub async fn notify(&self, event: ChangeEvent) {
        let mut dropped = Vec::new();

        {
            let subscribers = self.subscribers.read().await;
            for (id, subscriber) in subscribers.iter() {
                if !subscriber.target.observes(&event.target) {
                    continue;
                }
                if subscriber.sender.send(event.clone()).is_err() {
                    dropped.push(*id);
                }
            }
        }

        if !dropped.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in dropped {
                subscribers.remove(&id);
                tracing::warn!("{} dropped its handle, removing it", id);
            }
        }
    }

    pub async fn subscriber_count(&self) -> usize {
        let subscribers = self.subscribers.read().await;
        subscribers.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    #[error("Subscription not found: {0}")]
    NotFound(SubscriptionId),
}

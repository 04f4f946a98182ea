//! Fan-out of auth state changes to registered listeners.

use std::collections::HashMap;

use so_core::ids::SubscriptionId;
use so_core::ports::{AuthEvent, AuthSubscription};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tracing::{debug, warn};

const DEFAULT_CAPACITY: usize = 32;

/// Registry of auth event listeners keyed by [`SubscriptionId`].
pub struct AuthEventHub {
    subscribers: Mutex<HashMap<SubscriptionId, mpsc::Sender<AuthEvent>>>,
    capacity: usize,
}

impl AuthEventHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn subscribe(&self) -> AuthSubscription {
        let (tx, rx) = mpsc::channel(self.capacity);
        let id = SubscriptionId::generate();
        self.subscribers.lock().await.insert(id.clone(), tx);
        debug!(subscription_id = %id, "auth listener registered");
        AuthSubscription { id, events: rx }
    }

    /// Returns whether `id` was registered.
    pub async fn unsubscribe(&self, id: &SubscriptionId) -> bool {
        let removed = self.subscribers.lock().await.remove(id).is_some();
        debug!(subscription_id = %id, removed, "auth listener removed");
        removed
    }

    /// Delivers `event` to every live listener and returns how many got it.
    ///
    /// Never waits: a full queue drops the event for that listener, a closed
    /// one is pruned.
    pub async fn publish(&self, event: AuthEvent) -> usize {
        let mut subscribers = self.subscribers.lock().await;
        let mut delivered = 0;
        subscribers.retain(|id, tx| match tx.try_send(event.clone()) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(subscription_id = %id, "auth listener queue full; event dropped");
                true
            }
            Err(TrySendError::Closed(_)) => {
                debug!(subscription_id = %id, "pruning closed auth listener");
                false
            }
        });
        delivered
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

impl Default for AuthEventHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_every_listener() {
        let hub = AuthEventHub::new();
        let mut first = hub.subscribe().await;
        let mut second = hub.subscribe().await;

        assert_eq!(hub.publish(AuthEvent::signed_out()).await, 2);
        assert_eq!(first.events.recv().await, Some(AuthEvent::signed_out()));
        assert_eq!(second.events.recv().await, Some(AuthEvent::signed_out()));
    }

    #[tokio::test]
    async fn closed_listeners_are_pruned() {
        let hub = AuthEventHub::new();
        let dropped = hub.subscribe().await;
        let _kept = hub.subscribe().await;
        drop(dropped);

        assert_eq!(hub.publish(AuthEvent::signed_out()).await, 1);
        assert_eq!(hub.subscriber_count().await, 1);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let hub = AuthEventHub::new();
        let mut subscription = hub.subscribe().await;

        assert!(hub.unsubscribe(&subscription.id).await);
        assert!(!hub.unsubscribe(&subscription.id).await);
        assert_eq!(hub.publish(AuthEvent::signed_out()).await, 0);
        assert_eq!(subscription.events.recv().await, None);
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let hub = AuthEventHub::with_capacity(1);
        let _subscription = hub.subscribe().await;

        assert_eq!(hub.publish(AuthEvent::signed_out()).await, 1);
        assert_eq!(hub.publish(AuthEvent::signed_out()).await, 0);
        assert_eq!(hub.subscriber_count().await, 1);
    }
}

use std::sync::Arc;

use so_core::ids::SubscriptionId;
use so_core::ports::AuthProviderPort;
use tokio::task::JoinHandle;
use tracing::debug;

/// Handle to a live auth-event listener.
///
/// Call [`unsubscribe`](Self::unsubscribe) on teardown. Dropping the handle
/// stops the listener task; the provider prunes the registration once it
/// notices the closed channel.
pub struct SessionSubscription {
    id: SubscriptionId,
    auth: Arc<dyn AuthProviderPort>,
    task: Option<JoinHandle<()>>,
}

impl SessionSubscription {
    pub(crate) fn new(
        id: SubscriptionId,
        auth: Arc<dyn AuthProviderPort>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            id,
            auth,
            task: Some(task),
        }
    }

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the listener and remove the provider registration.
    pub async fn unsubscribe(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.auth.unsubscribe(&self.id).await;
        debug!(subscription_id = %self.id, "unsubscribed from auth events");
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

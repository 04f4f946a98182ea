use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Shared flow context containing state and dispatch lock.
///
/// ## Lock Ordering
/// When acquiring both locks, acquire `dispatch_lock` first, then `state`.
/// - `dispatch_lock`: held for a whole dispatch (transition + actions + emit).
/// - `state`: held only for short reads and writes, never across a provider call.
pub struct FlowContext<S> {
    state: Arc<Mutex<S>>,
    dispatch_lock: Arc<Mutex<()>>,
}

impl<S> FlowContext<S> {
    pub fn new(initial_state: S) -> Self {
        Self {
            state: Arc::new(Mutex::new(initial_state)),
            dispatch_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Locks the state. Drop the guard before awaiting anything else.
    pub async fn state(&self) -> MutexGuard<'_, S> {
        self.state.lock().await
    }

    /// Serializes dispatch calls. Returns a guard that releases the lock when dropped.
    pub async fn acquire_dispatch_lock(&self) -> MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }
}

impl<S: Default> Default for FlowContext<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

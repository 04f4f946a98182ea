use std::sync::Arc;

use so_core::ports::{AuthEvent, AuthProviderPort, ProviderError, SessionChangeHandler};
use so_core::{AuthUser, SessionUser};
use tracing::{debug, info, warn, Instrument};

use super::SessionSubscription;
use crate::stores::ProfileStore;

/// Probes the provider session and merges it with the profile row.
pub struct SessionBridge {
    auth: Arc<dyn AuthProviderPort>,
    profiles: Arc<ProfileStore>,
}

impl SessionBridge {
    pub fn new(auth: Arc<dyn AuthProviderPort>, profiles: Arc<ProfileStore>) -> Self {
        Self { auth, profiles }
    }

    /// Current session merged with its profile, or `None` when signed out.
    pub async fn probe_session(&self) -> Result<Option<SessionUser>, ProviderError> {
        let session = self.auth.get_session().await?;
        match session {
            Some(session) => Ok(Some(self.merge(session.user).await)),
            None => {
                debug!("no active session");
                Ok(None)
            }
        }
    }

    /// Attach the profile row to `user`, creating an empty row when missing.
    ///
    /// Profile failures never fail the merge; the user proceeds without a
    /// profile.
    pub async fn merge(&self, user: AuthUser) -> SessionUser {
        let profile = match self.profiles.find(&user.id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => match self.profiles.create_empty(&user.id).await {
                Ok(profile) => Some(profile),
                Err(err) => {
                    warn!(user_id = %user.id, error = %err, "failed to create empty profile");
                    None
                }
            },
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "failed to load profile");
                None
            }
        };
        SessionUser::new(user, profile)
    }

    /// Forward every provider auth event to `handler` until the returned
    /// handle is unsubscribed or dropped.
    pub async fn subscribe(
        self: &Arc<Self>,
        handler: Arc<dyn SessionChangeHandler>,
    ) -> Result<SessionSubscription, ProviderError> {
        let subscription = self.auth.subscribe_auth_events().await?;
        let id = subscription.id.clone();
        let mut events = subscription.events;
        let bridge = Arc::clone(self);

        let span = tracing::info_span!("usecase.session_bridge.listener", subscription_id = %id);
        let task = tokio::spawn(
            async move {
                while let Some(event) = events.recv().await {
                    let user = bridge.resolve(event).await;
                    handler.on_session_changed(user).await;
                }
                debug!("auth event stream closed");
            }
            .instrument(span),
        );

        info!(subscription_id = %id, "subscribed to auth events");
        Ok(SessionSubscription::new(id, Arc::clone(&self.auth), task))
    }

    async fn resolve(&self, event: AuthEvent) -> Option<SessionUser> {
        debug!(change = ?event.change, "auth state changed");
        match event.user {
            Some(user) => Some(self.merge(user).await),
            None => None,
        }
    }
}

//! Authentication port - abstracts the hosted identity service
//!
//! Sign-up, password sign-in, sign-out, session lookup and a push stream of
//! auth state changes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::ProviderError;
use crate::ids::SubscriptionId;
use crate::session::{AuthUser, Credentials, Session, SignUpRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthChange {
    SignedIn,
    SignedOut,
}

/// Provider-pushed notification. `user` is absent once signed out.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthEvent {
    pub change: AuthChange,
    pub user: Option<AuthUser>,
}

impl AuthEvent {
    pub fn signed_in(user: AuthUser) -> Self {
        Self {
            change: AuthChange::SignedIn,
            user: Some(user),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            change: AuthChange::SignedOut,
            user: None,
        }
    }
}

/// One registration on the provider's event stream.
///
/// The registration stays active until [`AuthProviderPort::unsubscribe`] is
/// called with `id` or the receiver is dropped.
#[derive(Debug)]
pub struct AuthSubscription {
    pub id: SubscriptionId,
    pub events: mpsc::Receiver<AuthEvent>,
}

#[async_trait]
pub trait AuthProviderPort: Send + Sync {
    /// Create an account. Email confirmation, when required, happens out-of-band.
    async fn sign_up(&self, request: SignUpRequest) -> Result<AuthUser, ProviderError>;

    async fn sign_in_with_password(
        &self,
        credentials: Credentials,
    ) -> Result<Session, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Current session, if any.
    async fn get_session(&self) -> Result<Option<Session>, ProviderError>;

    /// Register for auth state changes.
    async fn subscribe_auth_events(&self) -> Result<AuthSubscription, ProviderError>;

    /// Remove a registration. Unknown ids are ignored.
    async fn unsubscribe(&self, id: &SubscriptionId);
}

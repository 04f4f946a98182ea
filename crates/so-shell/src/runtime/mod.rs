//! Shell runtime
//!
//! Owns the wired provider, both flow orchestrators and their session
//! subscriptions for the lifetime of the process.

use std::sync::Arc;

use anyhow::Context;
use so_app::{AuthFlowOrchestrator, MarketplaceOrchestrator, SessionSubscription};
use so_core::config::AppConfig;
use so_core::ports::{AuthProviderPort, SessionChangeHandler};
use tracing::{info, info_span, Instrument};

use crate::adapters::TracingEventEmitter;
use crate::bootstrap::{wire_dependencies, AppDeps, ProviderBackend};

pub struct ShellRuntime {
    backend: ProviderBackend,
    auth: Arc<dyn AuthProviderPort>,
    auth_flow: Arc<AuthFlowOrchestrator>,
    marketplace: Arc<MarketplaceOrchestrator>,
    subscriptions: Vec<SessionSubscription>,
}

impl ShellRuntime {
    /// Wire dependencies from `config`, subscribe both flows to auth events
    /// and run their mount-time session probes.
    pub async fn start(config: &AppConfig) -> anyhow::Result<Self> {
        let deps = wire_dependencies(config, Arc::new(TracingEventEmitter))
            .context("Failed to wire dependencies")?;
        Self::from_deps(deps).await
    }

    pub async fn from_deps(deps: AppDeps) -> anyhow::Result<Self> {
        let span = info_span!("shell.runtime.start", backend = ?deps.backend);
        async move {
            let auth_handler: Arc<dyn SessionChangeHandler> = deps.auth_flow.clone();
            let market_handler: Arc<dyn SessionChangeHandler> = deps.marketplace.clone();

            let mut subscriptions = Vec::with_capacity(2);
            for handler in [auth_handler, market_handler] {
                let subscription = deps
                    .session
                    .subscribe(handler)
                    .await
                    .context("Failed to subscribe to auth events")?;
                subscriptions.push(subscription);
            }

            deps.auth_flow.start().await;
            deps.marketplace.start().await;

            info!(subscriptions = subscriptions.len(), "shell runtime started");
            Ok(Self {
                backend: deps.backend,
                auth: deps.auth,
                auth_flow: deps.auth_flow,
                marketplace: deps.marketplace,
                subscriptions,
            })
        }
        .instrument(span)
        .await
    }

    pub fn backend(&self) -> ProviderBackend {
        self.backend
    }

    pub fn auth(&self) -> &Arc<dyn AuthProviderPort> {
        &self.auth
    }

    pub fn auth_flow(&self) -> &Arc<AuthFlowOrchestrator> {
        &self.auth_flow
    }

    pub fn marketplace(&self) -> &Arc<MarketplaceOrchestrator> {
        &self.marketplace
    }

    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.iter().filter(|s| s.is_active()).count()
    }

    /// Remove every auth-event registration and stop the listener tasks.
    pub async fn shutdown(self) {
        let count = self.subscriptions.len();
        for subscription in self.subscriptions {
            subscription.unsubscribe().await;
        }
        info!(subscriptions = count, "shell runtime stopped");
    }
}

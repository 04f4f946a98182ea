use so_core::ports::{FlowEventPort, MarketEventPort};
use so_core::{FlowSnapshot, MarketSnapshot};
use tracing::debug;

/// Event sink for the line shell.
///
/// The shell prints the snapshot each command returns, so pushed changes
/// (a sign-out from the provider, a probed session) only need to be traced.
#[derive(Debug, Default)]
pub struct TracingEventEmitter;

#[async_trait::async_trait]
impl FlowEventPort for TracingEventEmitter {
    async fn emit_flow_changed(&self, snapshot: FlowSnapshot) {
        debug!(
            view = ?snapshot.view,
            signed_in = snapshot.user.is_some(),
            errors = snapshot.errors.len(),
            "auth flow changed"
        );
    }
}

#[async_trait::async_trait]
impl MarketEventPort for TracingEventEmitter {
    async fn emit_market_changed(&self, snapshot: MarketSnapshot) {
        debug!(
            view = ?snapshot.view,
            signed_in = snapshot.user.is_some(),
            requests = snapshot.requests.len(),
            "marketplace flow changed"
        );
    }
}

use crate::marketplace::MarketSnapshot;
use crate::view::FlowSnapshot;

/// Receives every auth-flow state change, e.g. to re-render a front end.
#[async_trait::async_trait]
pub trait FlowEventPort: Send + Sync {
    async fn emit_flow_changed(&self, snapshot: FlowSnapshot);
}

/// Receives every marketplace state change.
#[async_trait::async_trait]
pub trait MarketEventPort: Send + Sync {
    async fn emit_market_changed(&self, snapshot: MarketSnapshot);
}

/// Event sink for hosts that poll snapshots instead.
pub struct NoopFlowEvents;

#[async_trait::async_trait]
impl FlowEventPort for NoopFlowEvents {
    async fn emit_flow_changed(&self, _snapshot: FlowSnapshot) {}
}

#[async_trait::async_trait]
impl MarketEventPort for NoopFlowEvents {
    async fn emit_market_changed(&self, _snapshot: MarketSnapshot) {}
}

//! Marketplace domain module.
//!
//! Fans request personalised video messages from celebrities; celebrities
//! accept, reject and fulfil them. Also covers the family recording and
//! share-link branch.

mod model;
mod snapshot;
pub mod state_machine;

pub use model::{
    Celebrity, MarketplaceError, NewVideoRequest, RequestStatus, Role, ShareLink, VideoRequest,
};
pub use snapshot::MarketSnapshot;
pub use state_machine::{MarketAction, MarketEvent, MarketStateMachine, MarketView};

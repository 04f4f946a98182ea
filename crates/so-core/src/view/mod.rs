//! Auth and profile view domain module.
//!
//! Defines the screens of the auth flow and the pure transition function
//! that moves between them.

mod snapshot;
pub mod state_machine;

pub use snapshot::{DashboardAffordance, FlowSnapshot};
pub use state_machine::{ProfileEditMode, ViewAction, ViewEvent, ViewState, ViewStateMachine};

use serde::Serialize;

use super::ViewState;
use crate::form::{ErrorState, FormState};
use crate::session::SessionUser;

/// Which profile entry point the dashboard offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DashboardAffordance {
    CreateProfile,
    UpdateProfile,
}

impl DashboardAffordance {
    pub fn for_user(user: &SessionUser) -> Self {
        if user.has_profile_data() {
            DashboardAffordance::UpdateProfile
        } else {
            DashboardAffordance::CreateProfile
        }
    }
}

/// Everything a front end needs to draw the auth flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowSnapshot {
    pub view: ViewState,
    pub form: FormState,
    pub errors: ErrorState,
    pub loading: bool,
    pub user: Option<SessionUser>,
    pub affordance: Option<DashboardAffordance>,
    /// One-shot confirmation such as the post-signup "check your email".
    pub notice: Option<String>,
}

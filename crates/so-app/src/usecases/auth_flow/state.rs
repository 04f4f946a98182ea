use so_core::form::{ErrorState, FormState};
use so_core::view::{DashboardAffordance, FlowSnapshot, ViewState};
use so_core::SessionUser;

/// The view/form/session triple owned by one auth flow.
#[derive(Debug, Default)]
pub struct AuthFlowState {
    pub view: ViewState,
    pub form: FormState,
    pub errors: ErrorState,
    pub loading: bool,
    pub user: Option<SessionUser>,
    pub notice: Option<String>,
}

impl AuthFlowState {
    pub fn snapshot(&self) -> FlowSnapshot {
        let affordance = match (self.view, self.user.as_ref()) {
            (ViewState::Dashboard, Some(user)) => Some(DashboardAffordance::for_user(user)),
            _ => None,
        };
        FlowSnapshot {
            view: self.view,
            form: self.form.clone(),
            errors: self.errors.clone(),
            loading: self.loading,
            user: self.user.clone(),
            affordance,
            notice: self.notice.clone(),
        }
    }
}

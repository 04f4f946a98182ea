use so_core::form::{ErrorState, FormState};
use so_core::marketplace::{Celebrity, MarketSnapshot, MarketView, VideoRequest};
use so_core::SessionUser;

#[derive(Debug, Default)]
pub struct MarketFlowState {
    pub view: MarketView,
    pub form: FormState,
    pub errors: ErrorState,
    pub loading: bool,
    pub user: Option<SessionUser>,
    pub celebrities: Vec<Celebrity>,
    /// Fan: requests placed. Celebrity: requests received.
    pub requests: Vec<VideoRequest>,
    pub selected_celebrity: Option<Celebrity>,
    pub notice: Option<String>,
}

impl MarketFlowState {
    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            view: self.view.clone(),
            form: self.form.clone(),
            errors: self.errors.clone(),
            loading: self.loading,
            user: self.user.clone(),
            celebrities: self.celebrities.clone(),
            requests: self.requests.clone(),
            selected_celebrity: self.selected_celebrity.clone(),
            notice: self.notice.clone(),
        }
    }

    /// Drops everything tied to the signed-in user.
    pub fn clear_session(&mut self) {
        self.user = None;
        self.celebrities.clear();
        self.requests.clear();
        self.selected_celebrity = None;
    }
}

use serde::Serialize;

use super::{Celebrity, MarketView, VideoRequest};
use crate::form::{ErrorState, FormState};
use crate::session::SessionUser;

/// Everything a front end needs to draw the marketplace flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub view: MarketView,
    pub form: FormState,
    pub errors: ErrorState,
    pub loading: bool,
    pub user: Option<SessionUser>,
    pub celebrities: Vec<Celebrity>,
    pub requests: Vec<VideoRequest>,
    pub selected_celebrity: Option<Celebrity>,
    /// One-shot confirmation such as "Request sent successfully!".
    pub notice: Option<String>,
}

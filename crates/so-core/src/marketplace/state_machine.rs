//! Marketplace view state machine.
//!
//! Role is resolved once at sign-in and carried by the state itself: fan
//! screens hang off `FanDashboard`, celebrity screens off `CelebrityDashboard`.

use serde::{Deserialize, Serialize};

use super::{RequestStatus, Role, ShareLink};
use crate::ids::{CelebrityId, RequestId};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum MarketView {
    /// Role picker.
    #[default]
    Home,
    Login {
        role: Role,
    },
    Signup {
        role: Role,
    },
    FanDashboard,
    CelebrityDashboard,
    /// Celebrity catalog.
    Browse,
    RequestForm {
        celebrity_id: CelebrityId,
    },
    /// Fan records a message for family.
    FamilyRecord,
    ShareVideo {
        link: ShareLink,
    },
    /// Celebrity records the video for an accepted request.
    RecordVideo {
        request_id: RequestId,
    },
}

impl MarketView {
    pub fn dashboard_for(role: Role) -> Self {
        match role {
            Role::Fan => MarketView::FanDashboard,
            Role::Celebrity => MarketView::CelebrityDashboard,
        }
    }

    pub fn is_signed_in_screen(&self) -> bool {
        !matches!(
            self,
            MarketView::Home | MarketView::Login { .. } | MarketView::Signup { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    ChooseRole { role: Role },
    ShowSignup,
    ShowLogin,
    BackHome,
    SubmitCredentials,
    SignedIn { role: Role },
    SignedUp,
    SubmitFailed,
    OpenBrowse,
    SelectCelebrity { celebrity_id: CelebrityId },
    SubmitRequest,
    RequestCreated,
    StartFamilyRecording,
    GenerateShareLink,
    ShareLinkIssued { link: ShareLink },
    AcceptRequest { request_id: RequestId },
    RejectRequest { request_id: RequestId, reason: String },
    RecordFor { request_id: RequestId },
    SendVideo,
    VideoSent,
    Back,
    /// A session appeared without a sign-in on this flow (startup probe or
    /// provider push).
    SessionRestored { role: Role },
    SessionChanged { signed_in: bool },
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketAction {
    SignIn,
    SignUp,
    /// Pre-checks the celebrity box on the registration form.
    PresetRole { role: Role },
    LoadDashboard { role: Role },
    LoadCelebrities,
    CreateRequest { celebrity_id: CelebrityId },
    IssueShareLink,
    SetRequestStatus {
        request_id: RequestId,
        status: RequestStatus,
        reason: Option<String>,
    },
    SignOut,
    ResetForm,
    ClearErrors,
}

pub struct MarketStateMachine;

impl MarketStateMachine {
    pub fn transition(state: MarketView, event: MarketEvent) -> (MarketView, Vec<MarketAction>) {
        use MarketView::*;

        match (state, event) {
            (_, MarketEvent::Logout) => {
                (Home, vec![MarketAction::SignOut, MarketAction::ResetForm])
            }

            (Home, MarketEvent::ChooseRole { role }) => {
                (Login { role }, vec![MarketAction::ClearErrors])
            }
            (Login { role }, MarketEvent::ShowSignup) => (
                Signup { role },
                vec![MarketAction::ClearErrors, MarketAction::PresetRole { role }],
            ),
            (Signup { role }, MarketEvent::ShowLogin) => {
                (Login { role }, vec![MarketAction::ClearErrors])
            }
            (Login { .. } | Signup { .. }, MarketEvent::BackHome) => {
                (Home, vec![MarketAction::ResetForm, MarketAction::ClearErrors])
            }

            (Login { role }, MarketEvent::SubmitCredentials) => {
                (Login { role }, vec![MarketAction::SignIn])
            }
            (Signup { role }, MarketEvent::SubmitCredentials) => {
                (Signup { role }, vec![MarketAction::SignUp])
            }
            (Login { .. }, MarketEvent::SignedIn { role }) => (
                MarketView::dashboard_for(role),
                vec![MarketAction::LoadDashboard { role }],
            ),
            (Signup { role }, MarketEvent::SignedUp) => {
                (Login { role }, vec![MarketAction::ResetForm])
            }

            // fan branch
            (FanDashboard, MarketEvent::OpenBrowse) => {
                (Browse, vec![MarketAction::LoadCelebrities])
            }
            (Browse, MarketEvent::SelectCelebrity { celebrity_id }) => {
                (RequestForm { celebrity_id }, vec![MarketAction::ClearErrors])
            }
            (RequestForm { celebrity_id }, MarketEvent::SubmitRequest) => (
                RequestForm {
                    celebrity_id: celebrity_id.clone(),
                },
                vec![MarketAction::CreateRequest { celebrity_id }],
            ),
            (RequestForm { .. }, MarketEvent::RequestCreated) => (
                FanDashboard,
                vec![
                    MarketAction::ResetForm,
                    MarketAction::LoadDashboard { role: Role::Fan },
                ],
            ),
            (FanDashboard, MarketEvent::StartFamilyRecording) => (FamilyRecord, Vec::new()),
            (FamilyRecord, MarketEvent::GenerateShareLink) => {
                (FamilyRecord, vec![MarketAction::IssueShareLink])
            }
            (FamilyRecord, MarketEvent::ShareLinkIssued { link }) => {
                (ShareVideo { link }, vec![MarketAction::ResetForm])
            }
            (RequestForm { .. }, MarketEvent::Back) => (Browse, vec![MarketAction::ClearErrors]),
            (Browse | FamilyRecord | ShareVideo { .. }, MarketEvent::Back) => (
                FanDashboard,
                vec![MarketAction::LoadDashboard { role: Role::Fan }],
            ),

            // celebrity branch
            (CelebrityDashboard, MarketEvent::AcceptRequest { request_id }) => (
                CelebrityDashboard,
                vec![
                    MarketAction::SetRequestStatus {
                        request_id,
                        status: RequestStatus::Accepted,
                        reason: None,
                    },
                    MarketAction::LoadDashboard {
                        role: Role::Celebrity,
                    },
                ],
            ),
            (CelebrityDashboard, MarketEvent::RejectRequest { request_id, reason }) => (
                CelebrityDashboard,
                vec![
                    MarketAction::SetRequestStatus {
                        request_id,
                        status: RequestStatus::Rejected,
                        reason: Some(reason),
                    },
                    MarketAction::LoadDashboard {
                        role: Role::Celebrity,
                    },
                ],
            ),
            (CelebrityDashboard, MarketEvent::RecordFor { request_id }) => {
                (RecordVideo { request_id }, Vec::new())
            }
            (RecordVideo { request_id }, MarketEvent::SendVideo) => (
                RecordVideo {
                    request_id: request_id.clone(),
                },
                vec![MarketAction::SetRequestStatus {
                    request_id,
                    status: RequestStatus::Completed,
                    reason: None,
                }],
            ),
            (RecordVideo { .. }, MarketEvent::VideoSent) => (
                CelebrityDashboard,
                vec![MarketAction::LoadDashboard {
                    role: Role::Celebrity,
                }],
            ),
            (RecordVideo { .. }, MarketEvent::Back) => (
                CelebrityDashboard,
                vec![MarketAction::LoadDashboard {
                    role: Role::Celebrity,
                }],
            ),

            (Home | Login { .. } | Signup { .. }, MarketEvent::SessionRestored { role }) => (
                MarketView::dashboard_for(role),
                vec![MarketAction::LoadDashboard { role }],
            ),
            (state, MarketEvent::SessionChanged { signed_in: false })
                if state.is_signed_in_screen() =>
            {
                (Home, vec![MarketAction::ResetForm])
            }

            (state, _event) => (state, Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_routes_to_role_specific_login() {
        let (next, _) = MarketStateMachine::transition(
            MarketView::Home,
            MarketEvent::ChooseRole {
                role: Role::Celebrity,
            },
        );
        assert_eq!(
            next,
            MarketView::Login {
                role: Role::Celebrity
            }
        );
    }

    #[test]
    fn signup_from_celebrity_login_presets_role() {
        let (next, actions) = MarketStateMachine::transition(
            MarketView::Login {
                role: Role::Celebrity,
            },
            MarketEvent::ShowSignup,
        );
        assert_eq!(
            next,
            MarketView::Signup {
                role: Role::Celebrity
            }
        );
        assert!(actions.contains(&MarketAction::PresetRole {
            role: Role::Celebrity
        }));
    }

    #[test]
    fn sign_in_routes_by_resolved_role_not_by_login_page() {
        let (next, actions) = MarketStateMachine::transition(
            MarketView::Login {
                role: Role::Celebrity,
            },
            MarketEvent::SignedIn { role: Role::Fan },
        );
        assert_eq!(next, MarketView::FanDashboard);
        assert_eq!(actions, vec![MarketAction::LoadDashboard { role: Role::Fan }]);
    }

    #[test]
    fn fans_cannot_trigger_celebrity_actions() {
        let (next, actions) = MarketStateMachine::transition(
            MarketView::FanDashboard,
            MarketEvent::AcceptRequest {
                request_id: RequestId::from("r1"),
            },
        );
        assert_eq!(next, MarketView::FanDashboard);
        assert!(actions.is_empty());
    }

    #[test]
    fn request_flow_returns_to_fan_dashboard() {
        let celebrity_id = CelebrityId::from("1");
        let (next, _) = MarketStateMachine::transition(
            MarketView::Browse,
            MarketEvent::SelectCelebrity {
                celebrity_id: celebrity_id.clone(),
            },
        );
        assert_eq!(
            next,
            MarketView::RequestForm {
                celebrity_id: celebrity_id.clone()
            }
        );

        let (next, actions) = MarketStateMachine::transition(next, MarketEvent::SubmitRequest);
        assert_eq!(actions, vec![MarketAction::CreateRequest { celebrity_id }]);

        let (next, _) = MarketStateMachine::transition(next, MarketEvent::RequestCreated);
        assert_eq!(next, MarketView::FanDashboard);
    }

    #[test]
    fn send_video_completes_request() {
        let request_id = RequestId::from("r9");
        let (next, actions) = MarketStateMachine::transition(
            MarketView::RecordVideo {
                request_id: request_id.clone(),
            },
            MarketEvent::SendVideo,
        );
        assert!(matches!(next, MarketView::RecordVideo { .. }));
        assert_eq!(
            actions,
            vec![MarketAction::SetRequestStatus {
                request_id,
                status: RequestStatus::Completed,
                reason: None,
            }]
        );
    }

    #[test]
    fn logout_returns_home() {
        let (next, actions) =
            MarketStateMachine::transition(MarketView::CelebrityDashboard, MarketEvent::Logout);
        assert_eq!(next, MarketView::Home);
        assert_eq!(actions, vec![MarketAction::SignOut, MarketAction::ResetForm]);
    }

    #[test]
    fn session_loss_on_signed_out_screen_is_ignored() {
        let login = MarketView::Login { role: Role::Fan };
        let (next, actions) = MarketStateMachine::transition(
            login.clone(),
            MarketEvent::SessionChanged { signed_in: false },
        );
        assert_eq!(next, login);
        assert!(actions.is_empty());
    }

    #[test]
    fn restored_session_lands_on_role_dashboard() {
        let (next, actions) = MarketStateMachine::transition(
            MarketView::Home,
            MarketEvent::SessionRestored {
                role: Role::Celebrity,
            },
        );
        assert_eq!(next, MarketView::CelebrityDashboard);
        assert_eq!(
            actions,
            vec![MarketAction::LoadDashboard {
                role: Role::Celebrity
            }]
        );

        let (next, actions) = MarketStateMachine::transition(
            MarketView::Browse,
            MarketEvent::SessionRestored { role: Role::Fan },
        );
        assert_eq!(next, MarketView::Browse);
        assert!(actions.is_empty());
    }
}

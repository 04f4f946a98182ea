//! Auth view state machine.
//!
//! Defines a pure state transition function for the login / signup /
//! dashboard / profile editor flow.

use serde::{Deserialize, Serialize};

/// Active screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewState {
    #[default]
    Login,
    Signup,
    Dashboard,
    CreateProfile,
    UpdateProfile,
}

impl ViewState {
    pub fn is_profile_editor(&self) -> bool {
        matches!(self, ViewState::CreateProfile | ViewState::UpdateProfile)
    }

    pub fn is_signed_out_screen(&self) -> bool {
        matches!(self, ViewState::Login | ViewState::Signup)
    }
}

/// Events that drive the auth flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewEvent {
    /// Toggle link from login to registration.
    ShowSignup,
    /// Toggle link from registration back to login.
    ShowLogin,
    /// A locally valid credential form was submitted.
    SubmitCredentials,
    SignInSucceeded,
    /// Account created; confirmation happens out-of-band.
    SignUpSucceeded,
    /// The provider rejected the submission; the message lives in the error state.
    SubmitFailed,
    OpenProfileEditor { has_profile: bool },
    /// A locally valid profile form was submitted.
    SubmitProfile,
    ProfileSaved,
    CancelEdit,
    /// Provider-pushed or probed session presence.
    SessionChanged { signed_in: bool },
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileEditMode {
    Create,
    Update,
}

/// Side-effects produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewAction {
    SignIn,
    SignUp,
    SaveProfile { mode: ProfileEditMode },
    PrefillProfileForm,
    SignOut,
    ResetForm,
    ClearErrors,
}

/// Pure auth view state machine: no side effects.
pub struct ViewStateMachine;

impl ViewStateMachine {
    pub fn transition(state: ViewState, event: ViewEvent) -> (ViewState, Vec<ViewAction>) {
        use ViewState::*;

        match (state, event) {
            (_, ViewEvent::Logout) => (Login, vec![ViewAction::SignOut, ViewAction::ResetForm]),

            (Login, ViewEvent::ShowSignup) => (Signup, vec![ViewAction::ClearErrors]),
            (Signup, ViewEvent::ShowLogin) => (Login, vec![ViewAction::ClearErrors]),

            (Login, ViewEvent::SubmitCredentials) => (Login, vec![ViewAction::SignIn]),
            (Signup, ViewEvent::SubmitCredentials) => (Signup, vec![ViewAction::SignUp]),
            (Login, ViewEvent::SignInSucceeded) => (Dashboard, Vec::new()),
            (Signup, ViewEvent::SignUpSucceeded) => (Login, vec![ViewAction::ResetForm]),

            (Dashboard, ViewEvent::OpenProfileEditor { has_profile }) => {
                let next = if has_profile {
                    UpdateProfile
                } else {
                    CreateProfile
                };
                (next, vec![ViewAction::PrefillProfileForm])
            }
            (CreateProfile, ViewEvent::SubmitProfile) => (
                CreateProfile,
                vec![ViewAction::SaveProfile {
                    mode: ProfileEditMode::Create,
                }],
            ),
            (UpdateProfile, ViewEvent::SubmitProfile) => (
                UpdateProfile,
                vec![ViewAction::SaveProfile {
                    mode: ProfileEditMode::Update,
                }],
            ),
            (CreateProfile | UpdateProfile, ViewEvent::ProfileSaved) => {
                (Dashboard, vec![ViewAction::ResetForm])
            }
            (CreateProfile | UpdateProfile, ViewEvent::CancelEdit) => {
                (Dashboard, vec![ViewAction::ClearErrors])
            }

            (Login | Signup, ViewEvent::SessionChanged { signed_in: true }) => {
                (Dashboard, Vec::new())
            }
            (
                Dashboard | CreateProfile | UpdateProfile,
                ViewEvent::SessionChanged { signed_in: false },
            ) => (Login, vec![ViewAction::ResetForm]),

            (state, _event) => (state, Vec::new()),
        }
    }
}

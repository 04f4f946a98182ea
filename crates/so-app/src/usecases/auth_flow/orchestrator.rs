//! Auth flow orchestrator.
//!
//! Runs the view state machine and executes its actions against the
//! provider ports. Validation failures and provider errors never escape as
//! `Err`: they land in the error state of the returned snapshot.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use so_core::form::{validate, FieldName, FieldValue, FormError, ValidationScope};
use so_core::ports::{AuthProviderPort, FlowEventPort, SessionChangeHandler};
use so_core::security::SecretString;
use so_core::session::{Credentials, Profile, SignUpRequest, UserMetadata};
use so_core::view::{
    FlowSnapshot, ProfileEditMode, ViewAction, ViewEvent, ViewStateMachine,
};
use so_core::SessionUser;

use super::AuthFlowState;
use crate::stores::ProfileStore;
use crate::usecases::context::FlowContext;
use crate::usecases::session::SessionBridge;
use crate::usecases::{profile_setup_failed, SIGNUP_NOTICE};

/// Errors produced by the auth flow orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum AuthFlowError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("profile editor requires a signed-in user")]
    NotSignedIn,
}

/// Orchestrator that drives the auth/profile view and its side effects.
pub struct AuthFlowOrchestrator {
    context: Arc<FlowContext<AuthFlowState>>,
    auth: Arc<dyn AuthProviderPort>,
    profiles: Arc<ProfileStore>,
    session: Arc<SessionBridge>,
    events: Arc<dyn FlowEventPort>,
}

impl AuthFlowOrchestrator {
    pub fn new(
        auth: Arc<dyn AuthProviderPort>,
        profiles: Arc<ProfileStore>,
        session: Arc<SessionBridge>,
        events: Arc<dyn FlowEventPort>,
    ) -> Self {
        Self {
            context: FlowContext::default().arc(),
            auth,
            profiles,
            session,
            events,
        }
    }

    /// Mount-time session probe. A present session moves the flow to the dashboard.
    pub async fn start(&self) -> FlowSnapshot {
        match self.session.probe_session().await {
            Ok(user) => self.on_session_changed(user).await,
            Err(err) => error!(error = %err, "session probe failed"),
        }
        self.snapshot().await
    }

    pub async fn snapshot(&self) -> FlowSnapshot {
        self.context.state().await.snapshot()
    }

    /// Upserts one field and clears that field's error, leaving the others.
    pub async fn set_field(
        &self,
        name: FieldName,
        value: FieldValue,
    ) -> Result<FlowSnapshot, AuthFlowError> {
        let snapshot = {
            let mut state = self.context.state().await;
            state.form.set_field(name, value)?;
            state.errors.clear_field(name);
            state.snapshot()
        };
        self.events.emit_flow_changed(snapshot.clone()).await;
        Ok(snapshot)
    }

    pub async fn show_signup(&self) -> Result<FlowSnapshot, AuthFlowError> {
        self.dispatch(ViewEvent::ShowSignup).await
    }

    pub async fn show_login(&self) -> Result<FlowSnapshot, AuthFlowError> {
        self.dispatch(ViewEvent::ShowLogin).await
    }

    /// Submits the active screen's form: credentials on login/signup, the
    /// profile on the editors. A no-op elsewhere.
    pub async fn submit(&self) -> Result<FlowSnapshot, AuthFlowError> {
        let view = self.context.state().await.view;
        if view.is_signed_out_screen() {
            self.dispatch(ViewEvent::SubmitCredentials).await
        } else if view.is_profile_editor() {
            self.dispatch(ViewEvent::SubmitProfile).await
        } else {
            Ok(self.snapshot().await)
        }
    }

    pub async fn open_profile_editor(&self) -> Result<FlowSnapshot, AuthFlowError> {
        let has_profile = {
            let state = self.context.state().await;
            state
                .user
                .as_ref()
                .map(SessionUser::has_profile_data)
                .unwrap_or(false)
        };
        self.dispatch(ViewEvent::OpenProfileEditor { has_profile })
            .await
    }

    pub async fn cancel_edit(&self) -> Result<FlowSnapshot, AuthFlowError> {
        self.dispatch(ViewEvent::CancelEdit).await
    }

    pub async fn logout(&self) -> Result<FlowSnapshot, AuthFlowError> {
        self.dispatch(ViewEvent::Logout).await
    }

    async fn dispatch(&self, event: ViewEvent) -> Result<FlowSnapshot, AuthFlowError> {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        self.dispatch_locked(event).await
    }

    /// Runs one dispatch. The caller holds the dispatch lock.
    async fn dispatch_locked(&self, event: ViewEvent) -> Result<FlowSnapshot, AuthFlowError> {
        let span = info_span!("usecase.auth_flow.dispatch", event = ?event);
        async {
            let mut current = {
                let mut state = self.context.state().await;
                state.notice = None;
                state.view
            };
            let mut pending_events = vec![event];

            while let Some(event) = pending_events.pop() {
                let from = current;
                let event_name = format!("{:?}", event);
                let (next, actions) = ViewStateMachine::transition(current, event);
                info!(from = ?from, to = ?next, event = %event_name, "view transition");
                self.context.state().await.view = next;
                let follow_up_events = self.execute_actions(actions).await?;
                current = next;
                self.emit().await;
                pending_events.extend(follow_up_events);
            }

            Ok(self.snapshot().await)
        }
        .instrument(span)
        .await
    }

    async fn execute_actions(
        &self,
        actions: Vec<ViewAction>,
    ) -> Result<Vec<ViewEvent>, AuthFlowError> {
        let mut follow_up_events = Vec::new();
        for action in actions {
            debug!(?action, "auth flow executing action");
            match action {
                ViewAction::SignIn => follow_up_events.push(self.sign_in().await),
                ViewAction::SignUp => follow_up_events.push(self.sign_up().await),
                ViewAction::SaveProfile { mode } => {
                    follow_up_events.push(self.save_profile(mode).await?)
                }
                ViewAction::PrefillProfileForm => {
                    let mut state = self.context.state().await;
                    let profile = state.user.as_ref().and_then(|user| user.profile.clone());
                    state.form.reset();
                    state.errors.clear();
                    if let Some(profile) = profile {
                        state.form.prefill_from_profile(&profile);
                    }
                }
                ViewAction::SignOut => self.sign_out().await,
                ViewAction::ResetForm => {
                    let mut state = self.context.state().await;
                    state.form.reset();
                    state.errors.clear();
                }
                ViewAction::ClearErrors => self.context.state().await.errors.clear(),
            }
        }
        Ok(follow_up_events)
    }

    async fn sign_in(&self) -> ViewEvent {
        let Some(form) = self.validated_form().await else {
            return ViewEvent::SubmitFailed;
        };

        self.set_loading(true).await;
        let result = self
            .auth
            .sign_in_with_password(Credentials {
                email: form.email.clone(),
                password: SecretString::new(form.password.clone()),
            })
            .await;

        match result {
            Ok(session) => {
                let user = self.session.merge(session.user).await;
                info!(user_id = %user.id(), "signed in");
                let mut state = self.context.state().await;
                state.loading = false;
                state.user = Some(user);
                ViewEvent::SignInSucceeded
            }
            Err(err) => {
                warn!(error = %err, "sign-in rejected");
                self.fail_submit(err.user_message()).await
            }
        }
    }

    async fn sign_up(&self) -> ViewEvent {
        let Some(form) = self.validated_form().await else {
            return ViewEvent::SubmitFailed;
        };

        self.set_loading(true).await;
        let request = SignUpRequest {
            credentials: Credentials {
                email: form.email.clone(),
                password: SecretString::new(form.password.clone()),
            },
            metadata: UserMetadata {
                first_name: Some(form.first_name.clone()),
                last_name: Some(form.last_name.clone()),
                is_celebrity: form.is_celebrity,
                ..UserMetadata::default()
            },
        };

        let user = match self.auth.sign_up(request).await {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "sign-up rejected");
                return self.fail_submit(err.user_message()).await;
            }
        };

        // The provider trigger may or may not have created the row yet; the
        // upsert writes it either way.
        let profile = Profile::from_form(user.id.clone(), &form, Utc::now());
        if let Err(err) = self.profiles.upsert(&profile).await {
            error!(user_id = %user.id, error = %err, "profile setup after sign-up failed");
            return self
                .fail_submit(profile_setup_failed(&err.user_message()))
                .await;
        }

        info!(user_id = %user.id, "account created");
        let mut state = self.context.state().await;
        state.loading = false;
        state.notice = Some(SIGNUP_NOTICE.to_string());
        ViewEvent::SignUpSucceeded
    }

    async fn save_profile(&self, mode: ProfileEditMode) -> Result<ViewEvent, AuthFlowError> {
        let user_id = {
            let state = self.context.state().await;
            state
                .user
                .as_ref()
                .map(|user| user.id().clone())
                .ok_or(AuthFlowError::NotSignedIn)?
        };
        let Some(form) = self.validated_form().await else {
            return Ok(ViewEvent::SubmitFailed);
        };

        self.set_loading(true).await;
        let profile = Profile::from_form(user_id.clone(), &form, Utc::now());
        match self.profiles.upsert(&profile).await {
            Ok(saved) => {
                info!(user_id = %user_id, ?mode, "profile saved");
                let mut state = self.context.state().await;
                state.loading = false;
                if let Some(user) = state.user.as_mut() {
                    user.merge_profile(saved);
                }
                Ok(ViewEvent::ProfileSaved)
            }
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "profile save failed");
                Ok(self.fail_submit(err.user_message()).await)
            }
        }
    }

    async fn sign_out(&self) {
        if let Err(err) = self.auth.sign_out().await {
            warn!(error = %err, "provider sign-out failed; clearing local session anyway");
        }
        self.context.state().await.user = None;
        info!("signed out");
    }

    /// Clears errors and validates against the active screen's rules; on
    /// failure stores the field errors and returns `None`.
    async fn validated_form(&self) -> Option<so_core::FormState> {
        let mut state = self.context.state().await;
        state.errors.clear();
        let scope = ValidationScope::for_view(&state.view);
        let errors = validate(&state.form, scope);
        if errors.is_empty() {
            Some(state.form.clone())
        } else {
            debug!(?scope, count = errors.len(), "validation failed");
            state.errors = errors;
            None
        }
    }

    async fn fail_submit(&self, message: String) -> ViewEvent {
        let mut state = self.context.state().await;
        state.loading = false;
        state.errors.set_submit(message);
        ViewEvent::SubmitFailed
    }

    async fn set_loading(&self, loading: bool) {
        let snapshot = {
            let mut state = self.context.state().await;
            state.loading = loading;
            state.snapshot()
        };
        self.events.emit_flow_changed(snapshot).await;
    }

    async fn emit(&self) {
        let snapshot = self.snapshot().await;
        self.events.emit_flow_changed(snapshot).await;
    }
}

#[async_trait]
impl SessionChangeHandler for AuthFlowOrchestrator {
    async fn on_session_changed(&self, user: Option<SessionUser>) {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        let signed_in = user.is_some();
        self.context.state().await.user = user;
        if let Err(err) = self
            .dispatch_locked(ViewEvent::SessionChanged { signed_in })
            .await
        {
            error!(error = %err, "failed to apply session change");
        }
    }
}

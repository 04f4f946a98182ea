//! Marketplace orchestrator.
//!
//! Drives [`MarketStateMachine`] and executes its actions: authentication
//! by role, the fan request flow, the celebrity fulfilment flow and the
//! family recording share link.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use so_core::form::{validate, FieldName, FieldValue, FormError, FormState, ValidationScope};
use so_core::ids::{CelebrityId, RequestId};
use so_core::marketplace::{
    Celebrity, MarketAction, MarketEvent, MarketSnapshot, MarketStateMachine, MarketView,
    MarketplaceError, NewVideoRequest, RequestStatus, Role, ShareLink,
};
use so_core::ports::{AuthProviderPort, MarketEventPort, SessionChangeHandler};
use so_core::security::SecretString;
use so_core::session::{AuthUser, Credentials, Profile, SignUpRequest, UserMetadata};
use so_core::SessionUser;

use super::MarketFlowState;
use crate::stores::{MarketplaceStore, ProfileStore};
use crate::usecases::context::FlowContext;
use crate::usecases::session::SessionBridge;
use crate::usecases::{profile_setup_failed, SIGNUP_NOTICE};

const REQUEST_SENT_NOTICE: &str = "Request sent successfully!";
const VIDEO_SENT_NOTICE: &str = "Video sent successfully!";

/// Errors produced by the marketplace orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceFlowError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Marketplace(#[from] MarketplaceError),
}

pub struct MarketplaceOrchestrator {
    context: Arc<FlowContext<MarketFlowState>>,
    auth: Arc<dyn AuthProviderPort>,
    profiles: Arc<ProfileStore>,
    market: Arc<MarketplaceStore>,
    session: Arc<SessionBridge>,
    events: Arc<dyn MarketEventPort>,
    share_base_url: String,
}

impl MarketplaceOrchestrator {
    pub fn new(
        auth: Arc<dyn AuthProviderPort>,
        profiles: Arc<ProfileStore>,
        market: Arc<MarketplaceStore>,
        session: Arc<SessionBridge>,
        events: Arc<dyn MarketEventPort>,
        share_base_url: impl Into<String>,
    ) -> Self {
        Self {
            context: FlowContext::default().arc(),
            auth,
            profiles,
            market,
            session,
            events,
            share_base_url: share_base_url.into(),
        }
    }

    /// Mount-time session probe; a live session opens the role's dashboard.
    pub async fn start(&self) -> MarketSnapshot {
        match self.session.probe_session().await {
            Ok(user) => self.on_session_changed(user).await,
            Err(err) => error!(error = %err, "session probe failed"),
        }
        self.snapshot().await
    }

    pub async fn snapshot(&self) -> MarketSnapshot {
        self.context.state().await.snapshot()
    }

    pub async fn set_field(
        &self,
        name: FieldName,
        value: FieldValue,
    ) -> Result<MarketSnapshot, MarketplaceFlowError> {
        let snapshot = {
            let mut state = self.context.state().await;
            state.form.set_field(name, value)?;
            state.errors.clear_field(name);
            state.snapshot()
        };
        self.events.emit_market_changed(snapshot.clone()).await;
        Ok(snapshot)
    }

    pub async fn choose_role(&self, role: Role) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::ChooseRole { role }).await
    }

    pub async fn show_signup(&self) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::ShowSignup).await
    }

    pub async fn show_login(&self) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::ShowLogin).await
    }

    pub async fn back_home(&self) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::BackHome).await
    }

    /// Submits the active form: credentials on login/signup, the video
    /// request on the request form. A no-op elsewhere.
    pub async fn submit(&self) -> Result<MarketSnapshot, MarketplaceFlowError> {
        let view = self.context.state().await.view.clone();
        match view {
            MarketView::Login { .. } | MarketView::Signup { .. } => {
                self.dispatch(MarketEvent::SubmitCredentials).await
            }
            MarketView::RequestForm { .. } => self.dispatch(MarketEvent::SubmitRequest).await,
            _ => Ok(self.snapshot().await),
        }
    }

    pub async fn browse(&self) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::OpenBrowse).await
    }

    /// Opens the request form for a celebrity from the loaded catalog.
    pub async fn select_celebrity(
        &self,
        celebrity_id: CelebrityId,
    ) -> Result<MarketSnapshot, MarketplaceFlowError> {
        {
            let mut state = self.context.state().await;
            if state.view == MarketView::Browse {
                let celebrity = state
                    .celebrities
                    .iter()
                    .find(|c| c.id == celebrity_id)
                    .cloned()
                    .ok_or_else(|| MarketplaceError::CelebrityNotFound(celebrity_id.clone()))?;
                state.selected_celebrity = Some(celebrity);
            }
        }
        self.dispatch(MarketEvent::SelectCelebrity { celebrity_id })
            .await
    }

    /// Reloads the signed-in user's requests: placed (fan) or received (celebrity).
    pub async fn refresh_requests(&self) -> MarketSnapshot {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        let role = self.context.state().await.user.as_ref().map(|user| user.role);
        if let Some(role) = role {
            self.load_dashboard(role).await;
        }
        self.emit().await
    }

    pub async fn record_family_video(&self) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::StartFamilyRecording).await
    }

    pub async fn generate_share_link(&self) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::GenerateShareLink).await
    }

    pub async fn accept(&self, request_id: RequestId) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::AcceptRequest { request_id })
            .await
    }

    pub async fn reject(
        &self,
        request_id: RequestId,
        reason: impl Into<String>,
    ) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::RejectRequest {
            request_id,
            reason: reason.into(),
        })
        .await
    }

    pub async fn record_for(
        &self,
        request_id: RequestId,
    ) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::RecordFor { request_id }).await
    }

    pub async fn send_video(&self) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::SendVideo).await
    }

    pub async fn back(&self) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::Back).await
    }

    pub async fn logout(&self) -> Result<MarketSnapshot, MarketplaceFlowError> {
        self.dispatch(MarketEvent::Logout).await
    }

    async fn dispatch(&self, event: MarketEvent) -> Result<MarketSnapshot, MarketplaceFlowError> {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        self.dispatch_locked(event).await
    }

    /// Runs one dispatch. The caller holds the dispatch lock.
    async fn dispatch_locked(
        &self,
        event: MarketEvent,
    ) -> Result<MarketSnapshot, MarketplaceFlowError> {
        let span = info_span!("usecase.marketplace.dispatch", event = ?event);
        async {
            let mut current = {
                let mut state = self.context.state().await;
                state.notice = None;
                state.view.clone()
            };
            let mut pending_events = vec![event];

            while let Some(event) = pending_events.pop() {
                let from = current.clone();
                let event_name = format!("{:?}", event);
                let (next, actions) = MarketStateMachine::transition(current, event);
                info!(from = ?from, to = ?next, event = %event_name, "market transition");
                self.context.state().await.view = next.clone();
                let follow_up_events = self.execute_actions(actions).await;
                current = next;
                self.emit().await;
                pending_events.extend(follow_up_events);
            }

            Ok(self.snapshot().await)
        }
        .instrument(span)
        .await
    }

    async fn execute_actions(&self, actions: Vec<MarketAction>) -> Vec<MarketEvent> {
        let mut follow_up_events = Vec::new();
        for action in actions {
            debug!(?action, "marketplace executing action");
            match action {
                MarketAction::SignIn => follow_up_events.push(self.sign_in().await),
                MarketAction::SignUp => follow_up_events.push(self.sign_up().await),
                MarketAction::PresetRole { role } => {
                    self.context.state().await.form.is_celebrity = role.is_celebrity();
                }
                MarketAction::LoadDashboard { role } => self.load_dashboard(role).await,
                MarketAction::LoadCelebrities => self.load_celebrities().await,
                MarketAction::CreateRequest { celebrity_id } => {
                    follow_up_events.push(self.create_request(celebrity_id).await)
                }
                MarketAction::IssueShareLink => {
                    let token = Uuid::new_v4().simple().to_string();
                    let link = ShareLink::new(&self.share_base_url, &token);
                    info!(%link, "share link issued");
                    follow_up_events.push(MarketEvent::ShareLinkIssued { link });
                }
                MarketAction::SetRequestStatus {
                    request_id,
                    status,
                    reason,
                } => {
                    if let Some(event) = self.set_request_status(request_id, status, reason).await
                    {
                        follow_up_events.push(event);
                    }
                }
                MarketAction::SignOut => self.sign_out().await,
                MarketAction::ResetForm => {
                    let mut state = self.context.state().await;
                    state.form.reset();
                    state.errors.clear();
                }
                MarketAction::ClearErrors => self.context.state().await.errors.clear(),
            }
        }
        follow_up_events
    }

    async fn sign_in(&self) -> MarketEvent {
        let Some(form) = self.validated_form().await else {
            return MarketEvent::SubmitFailed;
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
                let role = user.role;
                info!(user_id = %user.id(), %role, "signed in");
                let mut state = self.context.state().await;
                state.loading = false;
                state.user = Some(user);
                MarketEvent::SignedIn { role }
            }
            Err(err) => {
                warn!(error = %err, "sign-in rejected");
                self.fail_submit(err.user_message()).await
            }
        }
    }

    async fn sign_up(&self) -> MarketEvent {
        let Some(form) = self.validated_form().await else {
            return MarketEvent::SubmitFailed;
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

        if let Err(message) = self.set_up_account(&user, &form).await {
            return self.fail_submit(profile_setup_failed(&message)).await;
        }

        info!(user_id = %user.id, is_celebrity = form.is_celebrity, "account created");
        let mut state = self.context.state().await;
        state.loading = false;
        state.notice = Some(SIGNUP_NOTICE.to_string());
        MarketEvent::SignedUp
    }

    /// Profile row for every account, catalog entry for celebrities.
    async fn set_up_account(&self, user: &AuthUser, form: &FormState) -> Result<(), String> {
        let profile = Profile::from_form(user.id.clone(), form, Utc::now());
        if let Err(err) = self.profiles.upsert(&profile).await {
            error!(user_id = %user.id, error = %err, "profile setup after sign-up failed");
            return Err(err.user_message());
        }

        if form.is_celebrity {
            let celebrity = Celebrity {
                id: CelebrityId::from(user.id.as_str()),
                name: profile.full_name(),
                category: String::new(),
                price: 0,
                description: form.bio.clone(),
            };
            if let Err(err) = self.market.register_celebrity(&celebrity).await {
                error!(user_id = %user.id, error = %err, "celebrity listing setup failed");
                return Err(err.user_message());
            }
        }
        Ok(())
    }

    async fn load_dashboard(&self, role: Role) {
        let Some(user_id) = self.current_user_id().await else {
            return;
        };

        let result = match role {
            Role::Fan => self.market.requests_by_requester(&user_id).await,
            Role::Celebrity => {
                self.market
                    .requests_for_celebrity(&CelebrityId::from(user_id.as_str()))
                    .await
            }
        };

        let mut state = self.context.state().await;
        match result {
            Ok(requests) => {
                debug!(%role, count = requests.len(), "requests loaded");
                state.requests = requests;
            }
            Err(err) => {
                warn!(%role, error = %err, "failed to load requests");
                state.errors.set_submit(err.user_message());
            }
        }
    }

    async fn load_celebrities(&self) {
        let result = self.market.list_celebrities().await;
        let mut state = self.context.state().await;
        match result {
            Ok(celebrities) => {
                debug!(count = celebrities.len(), "celebrities loaded");
                state.celebrities = celebrities;
            }
            Err(err) => {
                warn!(error = %err, "failed to load celebrities");
                state.errors.set_submit(err.user_message());
            }
        }
    }

    async fn create_request(&self, celebrity_id: CelebrityId) -> MarketEvent {
        let Some(requester_id) = self.current_user_id().await else {
            return MarketEvent::SubmitFailed;
        };
        let Some(form) = self.validated_form().await else {
            return MarketEvent::SubmitFailed;
        };

        self.set_loading(true).await;
        let found = self.market.find_celebrity(&celebrity_id).await;
        match found {
            Ok(Some(_)) => {}
            Ok(None) => {
                let err = MarketplaceError::CelebrityNotFound(celebrity_id);
                warn!(error = %err, "request for unknown celebrity");
                return self.fail_submit(err.to_string()).await;
            }
            Err(err) => return self.fail_submit(err.user_message()).await,
        }

        let request = NewVideoRequest::pending(
            requester_id,
            celebrity_id,
            form.recipient_name.trim().to_string(),
            form.occasion.trim().to_string(),
            form.message_details.trim().to_string(),
            Utc::now(),
        );
        match self.market.create_request(request).await {
            Ok(created) => {
                info!(
                    request_id = %created.id,
                    celebrity_id = %created.celebrity_id,
                    "video request created"
                );
                let mut state = self.context.state().await;
                state.loading = false;
                state.notice = Some(REQUEST_SENT_NOTICE.to_string());
                MarketEvent::RequestCreated
            }
            Err(err) => {
                warn!(error = %err, "video request insert failed");
                self.fail_submit(err.user_message()).await
            }
        }
    }

    /// Moves a request the signed-in celebrity owns to `status`. Completion
    /// yields `VideoSent`; failures land in the submit slot.
    async fn set_request_status(
        &self,
        request_id: RequestId,
        status: RequestStatus,
        reason: Option<String>,
    ) -> Option<MarketEvent> {
        let celebrity_id = {
            let state = self.context.state().await;
            state
                .user
                .as_ref()
                .filter(|user| user.role.is_celebrity())
                .map(|user| CelebrityId::from(user.id().as_str()))
        }?;

        self.set_loading(true).await;
        let found = self
            .market
            .find_request_for_celebrity(&request_id, &celebrity_id)
            .await;
        let current = match found {
            Ok(Some(request)) => request,
            Ok(None) => {
                let err = MarketplaceError::RequestNotFound(request_id);
                return self.fail_status(err.to_string()).await;
            }
            Err(err) => return self.fail_status(err.user_message()).await,
        };

        if let Err(err) = current.status.transition(status) {
            warn!(request_id = %request_id, error = %err, "status change refused");
            return self.fail_status(err.to_string()).await;
        }

        let updated = self
            .market
            .update_status(&request_id, &celebrity_id, status, reason, Utc::now())
            .await;
        match updated {
            Ok(Some(updated)) => {
                info!(request_id = %updated.id, status = %updated.status, "request status updated");
                let mut state = self.context.state().await;
                state.loading = false;
                if status == RequestStatus::Completed {
                    state.notice = Some(VIDEO_SENT_NOTICE.to_string());
                    Some(MarketEvent::VideoSent)
                } else {
                    None
                }
            }
            Ok(None) => {
                self.fail_status(MarketplaceError::RequestNotFound(request_id).to_string())
                    .await
            }
            Err(err) => self.fail_status(err.user_message()).await,
        }
    }

    async fn sign_out(&self) {
        if let Err(err) = self.auth.sign_out().await {
            warn!(error = %err, "provider sign-out failed; clearing local session anyway");
        }
        self.context.state().await.clear_session();
        info!("signed out");
    }

    async fn current_user_id(&self) -> Option<so_core::UserId> {
        let state = self.context.state().await;
        state.user.as_ref().map(|user| user.id().clone())
    }

    async fn validated_form(&self) -> Option<FormState> {
        let mut state = self.context.state().await;
        state.errors.clear();
        let scope = ValidationScope::for_market_view(&state.view);
        let errors = validate(&state.form, scope);
        if errors.is_empty() {
            Some(state.form.clone())
        } else {
            debug!(?scope, count = errors.len(), "validation failed");
            state.errors = errors;
            None
        }
    }

    async fn fail_submit(&self, message: String) -> MarketEvent {
        let mut state = self.context.state().await;
        state.loading = false;
        state.errors.set_submit(message);
        MarketEvent::SubmitFailed
    }

    async fn fail_status(&self, message: String) -> Option<MarketEvent> {
        Some(self.fail_submit(message).await)
    }

    async fn set_loading(&self, loading: bool) {
        let snapshot = {
            let mut state = self.context.state().await;
            state.loading = loading;
            state.snapshot()
        };
        self.events.emit_market_changed(snapshot).await;
    }

    async fn emit(&self) -> MarketSnapshot {
        let snapshot = self.snapshot().await;
        self.events.emit_market_changed(snapshot.clone()).await;
        snapshot
    }
}

#[async_trait]
impl SessionChangeHandler for MarketplaceOrchestrator {
    async fn on_session_changed(&self, user: Option<SessionUser>) {
        let _dispatch_guard = self.context.acquire_dispatch_lock().await;
        let event = {
            let mut state = self.context.state().await;
            match user {
                Some(user) => {
                    let role = user.role;
                    state.user = Some(user);
                    MarketEvent::SessionRestored { role }
                }
                None => {
                    state.clear_session();
                    MarketEvent::SessionChanged { signed_in: false }
                }
            }
        };
        if let Err(err) = self.dispatch_locked(event).await {
            error!(error = %err, "failed to apply session change");
        }
    }
}

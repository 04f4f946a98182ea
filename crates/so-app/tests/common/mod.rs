#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use so_app::{
    AuthFlowOrchestrator, MarketplaceOrchestrator, MarketplaceStore, ProfileStore, SessionBridge,
    TableNames,
};
use so_core::form::{FieldName, FieldValue};
use so_core::ids::{SubscriptionId, UserId};
use so_core::marketplace::MarketSnapshot;
use so_core::ports::{
    AuthProviderPort, AuthSubscription, Filter, FlowEventPort, MarketEventPort, ProviderError,
    RecordStorePort,
};
use so_core::security::SecretString;
use so_core::session::{AuthUser, Credentials, Session, SignUpRequest, UserMetadata};
use so_core::view::FlowSnapshot;
use so_infra::InMemoryProvider;

mockall::mock! {
    pub Auth {}

    #[async_trait]
    impl AuthProviderPort for Auth {
        async fn sign_up(&self, request: SignUpRequest) -> Result<AuthUser, ProviderError>;
        async fn sign_in_with_password(&self, credentials: Credentials) -> Result<Session, ProviderError>;
        async fn sign_out(&self) -> Result<(), ProviderError>;
        async fn get_session(&self) -> Result<Option<Session>, ProviderError>;
        async fn subscribe_auth_events(&self) -> Result<AuthSubscription, ProviderError>;
        async fn unsubscribe(&self, id: &SubscriptionId);
    }
}

mockall::mock! {
    pub Records {}

    #[async_trait]
    impl RecordStorePort for Records {
        async fn select_single(&self, table: &str, filters: &[Filter]) -> Result<Option<Value>, ProviderError>;
        async fn select(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>, ProviderError>;
        async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, ProviderError>;
        async fn update(&self, table: &str, fields: Value, filters: &[Filter]) -> Result<Vec<Value>, ProviderError>;
        async fn upsert(&self, table: &str, row: Value) -> Result<Value, ProviderError>;
    }
}

static TRACE_INIT: Once = Once::new();

pub fn init_tracing() {
    TRACE_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Records every snapshot the orchestrators publish.
#[derive(Default)]
pub struct RecordingEvents {
    pub flow: Mutex<Vec<FlowSnapshot>>,
    pub market: Mutex<Vec<MarketSnapshot>>,
}

#[async_trait]
impl FlowEventPort for RecordingEvents {
    async fn emit_flow_changed(&self, snapshot: FlowSnapshot) {
        self.flow.lock().unwrap().push(snapshot);
    }
}

#[async_trait]
impl MarketEventPort for RecordingEvents {
    async fn emit_market_changed(&self, snapshot: MarketSnapshot) {
        self.market.lock().unwrap().push(snapshot);
    }
}

pub struct Harness {
    pub flow: Arc<AuthFlowOrchestrator>,
    pub bridge: Arc<SessionBridge>,
    pub events: Arc<RecordingEvents>,
}

pub fn auth_flow(auth: Arc<dyn AuthProviderPort>, records: Arc<dyn RecordStorePort>) -> Harness {
    init_tracing();
    let tables = TableNames::default();
    let profiles = Arc::new(ProfileStore::new(records, tables.profiles));
    let bridge = Arc::new(SessionBridge::new(Arc::clone(&auth), Arc::clone(&profiles)));
    let events = Arc::new(RecordingEvents::default());
    let flow = Arc::new(AuthFlowOrchestrator::new(
        auth,
        profiles,
        Arc::clone(&bridge),
        events.clone(),
    ));
    Harness {
        flow,
        bridge,
        events,
    }
}

pub fn in_memory_auth_flow(provider: &Arc<InMemoryProvider>) -> Harness {
    auth_flow(provider.clone(), provider.clone())
}

pub struct MarketHarness {
    pub market: Arc<MarketplaceOrchestrator>,
    pub bridge: Arc<SessionBridge>,
    pub events: Arc<RecordingEvents>,
}

pub fn marketplace(provider: &Arc<InMemoryProvider>) -> MarketHarness {
    init_tracing();
    let tables = TableNames::default();
    let profiles = Arc::new(ProfileStore::new(provider.clone(), tables.profiles));
    let market_store = Arc::new(MarketplaceStore::new(
        provider.clone(),
        tables.video_requests,
        tables.celebrities,
    ));
    let bridge = Arc::new(SessionBridge::new(provider.clone(), Arc::clone(&profiles)));
    let events = Arc::new(RecordingEvents::default());
    let market = Arc::new(MarketplaceOrchestrator::new(
        provider.clone(),
        profiles,
        market_store,
        Arc::clone(&bridge),
        events.clone(),
        "https://shoutout.test",
    ));
    MarketHarness {
        market,
        bridge,
        events,
    }
}

pub fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

pub async fn fill_registration(flow: &AuthFlowOrchestrator, email: &str, password: &str) {
    for (field, value) in [
        (FieldName::Email, email),
        (FieldName::Password, password),
        (FieldName::FirstName, "Ada"),
        (FieldName::LastName, "Lovelace"),
    ] {
        flow.set_field(field, text(value)).await.unwrap();
    }
}

pub async fn fill_login(flow: &AuthFlowOrchestrator, email: &str, password: &str) {
    flow.set_field(FieldName::Email, text(email)).await.unwrap();
    flow.set_field(FieldName::Password, text(password))
        .await
        .unwrap();
}

pub fn auth_user(id: &str, metadata: UserMetadata) -> AuthUser {
    AuthUser {
        id: UserId::from(id),
        email: "fan@test.com".to_string(),
        email_confirmed_at: Some(Utc::now()),
        created_at: Utc::now(),
        metadata,
    }
}

pub fn session_for(user: AuthUser) -> Session {
    Session {
        user,
        access_token: SecretString::new("token".to_string()),
        expires_at: None,
    }
}

pub async fn register(provider: &InMemoryProvider, email: &str, metadata: UserMetadata) -> AuthUser {
    provider
        .sign_up(SignUpRequest {
            credentials: Credentials {
                email: email.to_string(),
                password: SecretString::new("password123".to_string()),
            },
            metadata,
        })
        .await
        .unwrap()
}

/// Polls `check` until it holds or roughly a second has passed.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    false
}

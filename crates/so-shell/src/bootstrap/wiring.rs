//! # Dependency Injection
//!
//! Builds the provider adapter named in the config and assembles the stores,
//! the session bridge and both orchestrators around it.
//!
//! Assembly only: the config was loaded in `config.rs` and any policy lives
//! in the use cases. This is the only module that sees `so-infra` and
//! `so-app` side by side.

use std::sync::Arc;

use so_app::{
    AuthFlowOrchestrator, MarketplaceOrchestrator, MarketplaceStore, ProfileStore,
    SessionBridge, TableNames,
};
use so_core::config::AppConfig;
use so_core::ports::{
    AuthProviderPort, FlowEventPort, MarketEventPort, ProviderError, RecordStorePort,
};
use so_infra::{InMemoryOptions, InMemoryProvider, RestProvider, RestProviderConfig};
use tracing::info;

/// Share links point here when `[marketplace] share_base_url` is empty.
pub const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:3000";

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Unknown provider backend: {0} (expected \"memory\" or \"rest\")")]
    UnknownBackend(String),

    #[error("Missing configuration value: {0}")]
    MissingSetting(&'static str),

    #[error("Provider initialization failed: {0}")]
    ProviderInit(#[from] ProviderError),
}

/// Which provider adapter backs the flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderBackend {
    Memory,
    Rest,
}

impl ProviderBackend {
    /// An empty `backend` picks `rest` when a provider URL is known, else `memory`.
    pub fn from_config(config: &AppConfig) -> WiringResult<Self> {
        match config.provider_backend.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(ProviderBackend::Memory),
            "rest" => Ok(ProviderBackend::Rest),
            "" if config.provider_url.trim().is_empty() => Ok(ProviderBackend::Memory),
            "" => Ok(ProviderBackend::Rest),
            other => Err(WiringError::UnknownBackend(other.to_string())),
        }
    }
}

/// Everything the runtime owns after wiring.
pub struct AppDeps {
    pub backend: ProviderBackend,
    pub auth: Arc<dyn AuthProviderPort>,
    pub session: Arc<SessionBridge>,
    pub auth_flow: Arc<AuthFlowOrchestrator>,
    pub marketplace: Arc<MarketplaceOrchestrator>,
}

fn table_names(config: &AppConfig) -> TableNames {
    let defaults = TableNames::default();
    let pick = |configured: &str, default: String| {
        if configured.trim().is_empty() {
            default
        } else {
            configured.to_string()
        }
    };
    TableNames {
        profiles: pick(&config.profiles_table, defaults.profiles),
        video_requests: pick(&config.video_requests_table, defaults.video_requests),
        celebrities: pick(&config.celebrities_table, defaults.celebrities),
    }
}

fn share_base_url(config: &AppConfig) -> String {
    if config.share_base_url.trim().is_empty() {
        DEFAULT_SHARE_BASE_URL.to_string()
    } else {
        config.share_base_url.trim_end_matches('/').to_string()
    }
}

/// Both provider capabilities, backed by the same adapter instance.
fn create_provider(
    backend: ProviderBackend,
    config: &AppConfig,
    tables: &TableNames,
) -> WiringResult<(Arc<dyn AuthProviderPort>, Arc<dyn RecordStorePort>)> {
    match backend {
        ProviderBackend::Memory => {
            let provider = Arc::new(InMemoryProvider::new(InMemoryOptions {
                profiles_table: tables.profiles.clone(),
                celebrities_table: tables.celebrities.clone(),
                ..InMemoryOptions::default()
            }));
            let auth: Arc<dyn AuthProviderPort> = provider.clone();
            let records: Arc<dyn RecordStorePort> = provider;
            Ok((auth, records))
        }
        ProviderBackend::Rest => {
            if config.provider_url.trim().is_empty() {
                return Err(WiringError::MissingSetting("provider.url"));
            }
            if config.provider_anon_key.trim().is_empty() {
                return Err(WiringError::MissingSetting("provider.anon_key"));
            }
            let provider = Arc::new(RestProvider::new(RestProviderConfig::new(
                config.provider_url.trim(),
                config.provider_anon_key.trim(),
            ))?);
            let auth: Arc<dyn AuthProviderPort> = provider.clone();
            let records: Arc<dyn RecordStorePort> = provider;
            Ok((auth, records))
        }
    }
}

/// Wire all dependencies for the flows.
///
/// `events` receives every snapshot either orchestrator publishes.
pub fn wire_dependencies<E>(config: &AppConfig, events: Arc<E>) -> WiringResult<AppDeps>
where
    E: FlowEventPort + MarketEventPort + 'static,
{
    let backend = ProviderBackend::from_config(config)?;
    let tables = table_names(config);
    let (auth, records) = create_provider(backend, config, &tables)?;

    let profiles = Arc::new(ProfileStore::new(records.clone(), tables.profiles.clone()));
    let market_store = Arc::new(MarketplaceStore::new(
        records,
        tables.video_requests.clone(),
        tables.celebrities.clone(),
    ));
    let session = Arc::new(SessionBridge::new(auth.clone(), profiles.clone()));

    let auth_flow = Arc::new(AuthFlowOrchestrator::new(
        auth.clone(),
        profiles.clone(),
        session.clone(),
        events.clone(),
    ));
    let marketplace = Arc::new(MarketplaceOrchestrator::new(
        auth.clone(),
        profiles,
        market_store,
        session.clone(),
        events,
        share_base_url(config),
    ));

    info!(backend = ?backend, profiles_table = %tables.profiles, "dependencies wired");

    Ok(AppDeps {
        backend,
        auth,
        session,
        auth_flow,
        marketplace,
    })
}

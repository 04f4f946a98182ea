pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{
    apply_env_overrides, config_path_from_args, default_config_path, load_config, resolve_config,
};
pub use self::tracing::init_tracing_subscriber;
pub use wiring::{wire_dependencies, AppDeps, ProviderBackend, WiringError, WiringResult};

//! # Configuration Loader
//!
//! Reads the TOML configuration file into [`AppConfig`] and layers the
//! environment on top. Pure data loading: empty values stay empty and the
//! wiring step decides what they mean.
//!
//! Lookup order:
//! 1. `--config <path>` when given (the file must exist)
//! 2. `<config dir>/shoutout/config.toml` when present
//! 3. an empty config
//!
//! `SUPABASE_URL` and `SUPABASE_KEY` then override the `[provider]` section.

use std::path::PathBuf;

use anyhow::Context;
use so_core::config::AppConfig;
use tracing::debug;

pub const ENV_PROVIDER_URL: &str = "SUPABASE_URL";
pub const ENV_PROVIDER_KEY: &str = "SUPABASE_KEY";

const APP_DIR_NAME: &str = "shoutout";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Load configuration from a TOML file
///
/// **NO validation is performed**: missing sections become empty values.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// Platform default location of the config file, e.g.
/// `~/.config/shoutout/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Resolve the effective configuration for this process.
pub fn resolve_config(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let mut config = match explicit {
        Some(path) => load_config(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => load_config(path)?,
            _ => {
                debug!("no config file found, starting from an empty config");
                AppConfig::empty()
            }
        },
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Overwrite provider settings with `SUPABASE_URL` / `SUPABASE_KEY` when set.
pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Some(url) = non_empty_env(ENV_PROVIDER_URL) {
        debug!("provider url taken from {}", ENV_PROVIDER_URL);
        config.provider_url = url;
    }
    if let Some(key) = non_empty_env(ENV_PROVIDER_KEY) {
        debug!("provider key taken from {}", ENV_PROVIDER_KEY);
        config.provider_anon_key = key;
    }
}

/// Picks `--config <path>` (or `--config=<path>`) out of the process arguments.
pub fn config_path_from_args<I, S>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let arg = arg.as_ref();
        if arg == "--config" {
            return args.next().map(|path| PathBuf::from(path.as_ref()));
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

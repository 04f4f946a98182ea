//! Tracing configuration for Shoutout
//!
//! Registers one global subscriber with:
//!
//! - an `EnvFilter` (debug in dev builds, info in release, `RUST_LOG` wins)
//! - a stderr fmt layer, so stdout stays reserved for command output
//! - a file layer through `tracing-appender` in the platform data dir, or at
//!   the `[logging] file` path when configured
//! - a Sentry layer when `SENTRY_DSN` is set

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use anyhow::Context;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, prelude::*, registry};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static SENTRY_GUARD: OnceLock<sentry::ClientInitGuard> = OnceLock::new();

const DEFAULT_LOG_FILE: &str = "shoutout.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

fn is_development() -> bool {
    cfg!(debug_assertions)
}

/// Build the default filter directives for tracing
///
/// - **Development**: debug for the workspace crates
/// - **Production**: info for the workspace crates
/// - HTTP internals stay at warn either way
fn build_filter_directives(is_dev: bool) -> Vec<String> {
    let app_level = if is_dev { "debug" } else { "info" };
    let mut directives = vec![
        "info".to_string(),
        "hyper=warn".to_string(),
        "reqwest=warn".to_string(),
        "rustls=warn".to_string(),
    ];
    for krate in ["shoutout", "so_core", "so_app", "so_infra", "so_shell"] {
        directives.push(format!("{krate}={app_level}"));
    }
    directives
}

/// Initialize the tracing subscriber
///
/// Call once from `main`, after the config is loaded and before the runtime
/// is wired:
///
/// ```ignore
/// let config = so_shell::resolve_config(path)?;
/// so_shell::init_tracing_subscriber(config.log_file.as_deref())?;
/// ```
///
/// # Errors
///
/// Returns `Err` if a global subscriber is already registered.
pub fn init_tracing_subscriber(log_file: Option<&Path>) -> anyhow::Result<()> {
    let is_dev = is_development();

    let filter_directives = build_filter_directives(is_dev);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter_directives.join(",")));

    let sentry_layer = if let Ok(dsn) = std::env::var("SENTRY_DSN") {
        let guard = sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                traces_sample_rate: 1.0,
                ..Default::default()
            },
        ));

        if SENTRY_GUARD.set(guard).is_err() {
            eprintln!("Sentry guard already initialized");
        }

        Some(sentry_tracing::layer())
    } else {
        None
    };

    let stderr_writer: BoxMakeWriter = BoxMakeWriter::new(io::stderr);
    let file_writer = match build_file_writer(log_file) {
        Ok(writer) => Some(writer),
        Err(err) => {
            eprintln!("Failed to initialize file logging, logging to stderr only: {err:#}");
            None
        }
    };

    // "2026-01-15 10:30:45.123 INFO so_app::usecases: message"
    let stderr_layer = fmt::layer()
        .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
        .with_level(true)
        .with_target(true)
        .with_ansi(cfg!(not(test)))
        .with_writer(stderr_writer);

    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .with_timer(fmt::time::ChronoUtc::new(TIMESTAMP_FORMAT.to_string()))
            .with_level(true)
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false)
            .with_writer(writer)
    });

    let subscriber = registry()
        .with(env_filter)
        .with(sentry_layer)
        .with(stderr_layer);

    if let Some(layer) = file_layer {
        subscriber.with(layer).try_init()?;
    } else {
        subscriber.try_init()?;
    }

    Ok(())
}

/// Where the file layer writes: the configured path, else
/// `<data dir>/shoutout/logs/shoutout.log`.
fn log_file_location(configured: Option<&Path>) -> anyhow::Result<(PathBuf, String)> {
    if let Some(path) = configured {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid log file path: {}", path.display()))?
            .to_string();
        return Ok((dir, name));
    }

    let data_dir = dirs::data_local_dir().context("No platform data directory available")?;
    Ok((
        data_dir.join("shoutout").join("logs"),
        DEFAULT_LOG_FILE.to_string(),
    ))
}

fn build_file_writer(configured: Option<&Path>) -> anyhow::Result<NonBlocking> {
    let (dir, name) = log_file_location(configured)?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&dir, name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    LOG_GUARD
        .set(guard)
        .map_err(|_| anyhow::anyhow!("Tracing log guard already initialized"))?;

    Ok(non_blocking)
}

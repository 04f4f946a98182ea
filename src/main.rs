use anyhow::Context;
use so_shell::bootstrap::config_path_from_args;
use so_shell::{init_tracing_subscriber, resolve_config, run_shell, ShellRuntime};
use tokio::io::BufReader;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first, so SUPABASE_URL / SUPABASE_KEY from it override the config file
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let config_path = config_path_from_args(std::env::args().skip(1));
    let config = resolve_config(config_path).context("Failed to load configuration")?;

    if let Err(err) = init_tracing_subscriber(config.log_file.as_deref()) {
        eprintln!("Failed to initialize tracing: {err:#}");
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        dotenv = dotenv_loaded,
        "starting shoutout"
    );

    let runtime = ShellRuntime::start(&config).await?;
    info!(backend = ?runtime.backend(), "ready; type `help` for commands");

    let result = run_shell(
        &runtime,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await;
    if let Err(err) = &result {
        warn!(error = %err, "shell stopped with an error");
    }

    runtime.shutdown().await;
    result
}

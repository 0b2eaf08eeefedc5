use anyhow::{Context, Result};

use macro_tracker::config::AppConfig;
use macro_tracker::server::{router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env().context("Configuration error")?;
    let state = AppState::from_config(&config);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    log::info!("Macro tracker listening on http://{}", config.bind_addr);
    log::info!("Dashboard:    http://{}/", config.bind_addr);
    log::info!("Update cycle: http://{}/api/update-data", config.bind_addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

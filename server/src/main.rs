use std::env;

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;
use chrono::Local;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use family_budget_server::backend::config::AppConfig;
use family_budget_server::backend::domain::notification_service::weekly_summary;
use family_budget_server::backend::{create_router, initialize_backend, AppState};

const USAGE: &str = "usage: family-budget [serve | notify-weekly]";

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real deployments set the environment
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let command = env::args().nth(1).unwrap_or_else(|| "serve".to_string());
    let config = AppConfig::from_env()?;

    info!("Setting up backend");
    let app_state = initialize_backend(&config).await?;

    match command.as_str() {
        "serve" => serve(&config, app_state).await,
        "notify-weekly" => notify_weekly(app_state).await,
        "-h" | "--help" | "help" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => bail!("unknown command '{}'\n{}", other, USAGE),
    }
}

async fn serve(config: &AppConfig, app_state: AppState) -> Result<()> {
    let origin = HeaderValue::from_str(&config.allowed_origin)
        .with_context(|| format!("invalid allowed origin '{}'", config.allowed_origin))?;
    let app = create_router(app_state, origin);

    info!("Starting server on {}", config.bind_addr);
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Push the remaining weekly and monthly goals to every device, then exit
async fn notify_weekly(app_state: AppState) -> Result<()> {
    let today = Local::now().date_naive();
    let message = weekly_summary(&app_state.goal_service, &app_state.fiscal_service, today).await?;
    let result = app_state.notification_service.broadcast(&message).await?;
    info!(
        "Weekly summary sent: {} delivered, {} failed, {} removed",
        result.sent, result.failed, result.removed
    );
    Ok(())
}

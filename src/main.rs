mod app;
mod config;
mod db;
mod error;
mod extractors;
mod state;
mod users;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "userd=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    if let Err(e) = dotenv {
        tracing::warn!(error = %e, ".env not loaded; using process environment");
    }

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    let state = AppState::new(pool);
    let users = state.users.clone();

    let result = app::serve(app::build_app(state), &config.listen_addr()).await;

    users.close().await;
    tracing::info!("database pool closed");
    result
}

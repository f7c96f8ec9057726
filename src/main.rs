use std::sync::Arc;

use academy::{app, config::AppConfig, db, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "academy=debug,axum=info,tower_http=info".to_string());
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

    let config = Arc::new(AppConfig::from_env()?);
    tracing::info!(environment = %config.environment, "starting academy api");

    let pool = db::connect(&config.database).await?;
    db::migrate(&pool).await?;

    let state = AppState::from_pool(pool.clone(), config.clone());
    let router = app::build_app(state)?;
    let served = app::serve(router, &config.host, config.port).await;

    pool.close().await;
    tracing::info!("database pool closed");
    served
}

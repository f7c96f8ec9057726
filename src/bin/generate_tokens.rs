//! Prints long-lived tokens for the demo accounts.
//!
//! These use `DEMO_TOKEN_TTL_MINUTES` (7 days by default), not the 24h
//! `JWT_TTL_MINUTES` that register/login issue.

use anyhow::bail;
use time::Duration;

use academy::{
    auth::{jwt::JwtKeys, repo::PgUserStore},
    config::AppConfig,
    db,
    seed::{demo_user, DemoAccount, DEMO_INSTRUCTOR, DEMO_STUDENT},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "academy=warn".to_string()),
        )
        .init();

    if std::env::var("JWT_SECRET").map_or(true, |s| s.trim().is_empty()) {
        bail!("JWT_SECRET must be set; tokens signed with the development secret are useless");
    }
    let config = AppConfig::from_env()?;
    let keys = JwtKeys::new(&config.jwt);
    let ttl = Duration::minutes(config.jwt.demo_ttl_minutes);

    let pool = db::connect(&config.database).await?;
    let users = PgUserStore::new(pool.clone());
    let result = print_tokens(&users, &keys, ttl).await;
    pool.close().await;
    result
}

async fn print_tokens(users: &PgUserStore, keys: &JwtKeys, ttl: Duration) -> anyhow::Result<()> {
    for account in [&DEMO_INSTRUCTOR, &DEMO_STUDENT] {
        print_token(users, keys, ttl, account).await?;
    }
    println!("Use as: Authorization: Bearer <token>");
    Ok(())
}

async fn print_token(
    users: &PgUserStore,
    keys: &JwtKeys,
    ttl: Duration,
    account: &DemoAccount,
) -> anyhow::Result<()> {
    let (id, role) = demo_user(users, account).await?;
    let token = keys.issue_with_ttl(id, role, ttl)?;
    println!("{} ({role}, valid {} days)", account.email, ttl.whole_days());
    println!("{token}");
    println!();
    Ok(())
}

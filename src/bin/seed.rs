use academy::{
    auth::repo::PgUserStore,
    config::AppConfig,
    db,
    lessons::repo::PgLessonStore,
    seed::{seed_demo_data, DEMO_INSTRUCTOR, DEMO_STUDENT},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "academy=info".to_string()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let pool = db::connect(&config.database).await?;
    db::migrate(&pool).await?;

    let users = PgUserStore::new(pool.clone());
    let lessons = PgLessonStore::new(pool.clone());
    let result = seed_demo_data(&users, &lessons).await;
    pool.close().await;
    let report = result?;

    tracing::info!(?report, "seeding completed");
    println!("Demo accounts:");
    println!("  instructor: {} / {}", DEMO_INSTRUCTOR.email, DEMO_INSTRUCTOR.password);
    println!("  student:    {} / {}", DEMO_STUDENT.email, DEMO_STUDENT.password);
    Ok(())
}

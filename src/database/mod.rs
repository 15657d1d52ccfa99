use sqlx::{Pool, Sqlite, sqlite::SqlitePool};
use std::sync::Arc;

pub type DbPool = Arc<Pool<Sqlite>>;

pub async fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let pool = SqlitePool::connect(database_url).await?;
    run_migrations(&pool).await?;
    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &Pool<Sqlite>) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub async fn memory_pool() -> DbPool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    Arc::new(pool)
}

#[cfg(test)]
pub async fn seed_participant(pool: &DbPool, id: &str) {
    use chrono::Utc;

    let now = Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO participants (id, username, full_name, avatar_url, created_at, updated_at)
         VALUES (?, ?, ?, NULL, ?, ?)",
    )
    .bind(id)
    .bind(id)
    .bind(id)
    .bind(&now)
    .bind(&now)
    .execute(pool.as_ref())
    .await
    .expect("seed participant");
}

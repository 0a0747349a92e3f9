use crate::config::get_config;
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub async fn create_pool() -> Result<SqlitePool> {
    let config = get_config();
    connect(&config.database_url).await
}

/// SQLite serializes writers; a small pool with foreign keys enforced is
/// all the core needs. `create_if_missing` covers first boot on a file URL.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    // The busy timeout makes contending writers wait for the lock instead
    // of failing fast; booking transactions rely on this.
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(sqlx::Error::from)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(5));

    // Every pooled connection to ":memory:" would get its own database, so
    // in-memory URLs are pinned to a single connection.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect_with(options)
        .await?;
    Ok(pool)
}

// src/db.rs
use crate::error::AppResult;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Opens the SQLite database backing server-side sessions. Directory
/// data lives in the JSON key-value store; only session state goes here.
pub async fn create_session_pool() -> AppResult<SqlitePool> {
    let database_url = std::env::var("SESSIONS_DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://data/sessions.db".to_string());

    tracing::info!("Opening session database: {}", database_url);

    let options = SqliteConnectOptions::from_str(&database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

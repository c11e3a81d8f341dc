pub mod models;
pub mod repositories;
pub mod schema;

pub mod mock;

use std::time::Duration;

use eyre::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

pub type DbPool = Pool<Postgres>;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Pool sized for the registration workload: every registration holds a
/// transaction across two advisory locks, so the pool needs headroom beyond
/// one connection per in-flight request. `DATABASE_MAX_CONNECTIONS` overrides.
pub async fn create_pool(database_url: &str) -> Result<DbPool> {
    let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONNECTIONS);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    tracing::debug!("Database pool ready ({} connections max)", max_connections);
    Ok(pool)
}

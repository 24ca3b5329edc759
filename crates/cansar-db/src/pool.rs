//! Database connection pool setup.
//!
//! The loader is a one-shot batch job: it opens one small pool, runs the
//! load sequentially, and exits. The pipeline advances a single
//! transaction at a time, so two connections are enough headroom and no
//! further pool tuning surface is exposed.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use cansar_core::{Error, Result};

/// Connections held for one loader run.
pub const MAX_CONNECTIONS: u32 = 2;

/// How long to wait for the initial connection before giving up.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Open the connection pool for one loader run.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    let start = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        max_connections = MAX_CONNECTIONS,
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection established"
    );

    Ok(pool)
}

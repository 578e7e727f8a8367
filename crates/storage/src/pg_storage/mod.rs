//! PostgreSQL storage backend using sqlx.
//!
//! Split into modular files by domain concern.

#![allow(clippy::absolute_paths, reason = "std paths in error handling are clear")]

mod chat;
mod pending;
mod schools;
mod students;

use crate::error::StorageError;
use school_assist_core::{
    PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS, PG_POOL_MAX_CONNECTIONS,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::pg_migrations::run_pg_migrations;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect, then bring the schema up to date.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(std::time::Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(std::time::Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        run_pg_migrations(&pool).await.map_err(|e| StorageError::Migration(e.to_string()))?;
        tracing::info!("PgStorage initialized");
        Ok(Self { pool })
    }

    /// Re-run migrations on an existing pool.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        run_pg_migrations(&self.pool).await.map_err(|e| StorageError::Migration(e.to_string()))
    }
}

/// Convert `usize` to `i64` for SQL LIMIT binds.
/// Saturates to `i64::MAX` on overflow (only possible on 128-bit targets).
pub(crate) fn usize_to_i64(val: usize) -> i64 {
    i64::try_from(val).unwrap_or(i64::MAX)
}

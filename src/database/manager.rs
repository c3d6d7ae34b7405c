use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

use super::schema;

/// Errors from the SQL store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Handle to the SQLite-dialect store behind the `/sql/*` routes.
/// Cheap to clone; clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool for `url` (e.g. `sqlite://crm.db?mode=rwc`)
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, DatabaseError> {
        if url.contains(":memory:") {
            return Self::in_memory().await;
        }

        if !url.starts_with("sqlite:") {
            return Err(DatabaseError::InvalidDatabaseUrl(url.to_string()));
        }
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|_| DatabaseError::InvalidDatabaseUrl(url.to_string()))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!("Created database pool ({} max connections)", max_connections);
        Ok(Self { pool })
    }

    /// Private in-memory database. Every connection to `:memory:` is its own
    /// database, so the pool is pinned to a single connection that never
    /// expires.
    pub async fn in_memory() -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        info!("Created in-memory database pool");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), DatabaseError> {
        for statement in schema::STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema ready ({} statements)", schema::STATEMENTS.len());
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

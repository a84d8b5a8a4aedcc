use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::backend::config::is_valid_table_prefix;

/// DbConnection manages the SQLite pool and the table naming scheme
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
    table_prefix: String,
}

impl DbConnection {
    /// Create a new database connection, creating the database file if needed
    pub async fn new(url: &str, table_prefix: &str) -> Result<Self> {
        if !is_valid_table_prefix(table_prefix) {
            return Err(anyhow::anyhow!("Invalid table prefix: {}", table_prefix));
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        info!("Connected to database {}", url);

        Ok(Self {
            pool: Arc::new(pool),
            table_prefix: table_prefix.to_string(),
        })
    }

    /// Initialize an isolated in-memory database for tests
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // Each in-memory connection is its own database, so the pool holds
        // exactly one connection that never expires
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
            table_prefix: "wp_".to_string(),
        })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Full table name for an unprefixed table
    pub fn table(&self, name: &str) -> String {
        format!("{}{}", self.table_prefix, name)
    }
}

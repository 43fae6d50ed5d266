use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub type DatabaseDriver = sqlx::Sqlite;
pub type DatabasePool = sqlx::SqlitePool;

/// Owns the connection pool. Cloning shares the pool.
#[derive(Clone)]
pub struct Database {
    pool: DatabasePool,
}

impl Database {
    /// Open (creating if needed) the database at `url` with foreign keys on.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Each connection to `:memory:` is a separate database.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn clone_pool(&self) -> DatabasePool {
        self.pool.clone()
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

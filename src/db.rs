//! Database connection management and migrations.

use crate::error::Result;
use anyhow::Context as _;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

/// How long a writer waits on the database lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection bundle.
pub struct Db {
    /// SQLite pool for conversation snapshots.
    pub sqlite: SqlitePool,
}

impl Db {
    /// Connect to the history database and run migrations.
    ///
    /// WAL journaling lets concurrent readers proceed during a write; the busy
    /// timeout bounds how long a second writer queues behind the lock.
    pub async fn connect(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir).with_context(|| {
            format!("failed to create data directory: {}", data_dir.display())
        })?;

        let options = SqliteConnectOptions::new()
            .filename(data_dir.join("history.db"))
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let sqlite = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| "failed to connect to SQLite")?;

        sqlx::migrate!("./migrations")
            .run(&sqlite)
            .await
            .with_context(|| "failed to run database migrations")?;

        Ok(Self { sqlite })
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.sqlite.close().await;
    }
}

/// Create an isolated in-memory pool for testing. Each call gets its own
/// private database so tests can run in parallel without migration conflicts.
#[cfg(test)]
pub(crate) async fn connect_in_memory() -> SqlitePool {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .create_if_missing(true);

    // Single-connection pool: each pool gets its own private in-memory db.
    let pool = sqlx::pool::PoolOptions::<sqlx::Sqlite>::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory SQLite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

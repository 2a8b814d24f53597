//! SQLite-backed key-value storage for the tally.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use stocktally_inventory::{KeyValueStorage, StorageError};
use tokio::runtime::{Builder, Runtime};

/// Durable storage for inventory slots.
///
/// `KeyValueStorage` is synchronous, so the pool is driven by a private
/// current-thread runtime and every call blocks until SQLite answers.
#[derive(Debug)]
pub struct SqliteStorage {
    pool: SqlitePool,
    runtime: Runtime,
}

impl SqliteStorage {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create storage directory at {parent:?}"))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        Self::connect(options, 4, path.display().to_string())
    }

    /// Private in-memory database; contents vanish with the value.
    pub fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid in-memory SQLite URL")?;
        // Each connection to `:memory:` is its own database, so keep exactly one.
        Self::connect(options, 1, ":memory:".to_string())
    }

    fn connect(
        options: SqliteConnectOptions,
        max_connections: u32,
        location: String,
    ) -> anyhow::Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to create runtime for SqliteStorage")?;

        let pool = runtime.block_on(async {
            let pool = SqlitePoolOptions::new()
                .max_connections(max_connections)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
                .with_context(|| format!("failed to open SQLite database at {location}"))?;

            sqlx::query(
                r#"
                CREATE TABLE IF NOT EXISTS kv_store (
                    key        TEXT PRIMARY KEY NOT NULL,
                    value      TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )
                "#,
            )
            .execute(&pool)
            .await
            .context("failed to create kv_store table")?;

            Ok::<_, anyhow::Error>(pool)
        })?;

        tracing::debug!(location = %location, "sqlite storage opened");
        Ok(Self { pool, runtime })
    }

    /// When a slot was last written (RFC 3339), if ever.
    pub fn updated_at(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.runtime.block_on(async {
            let row = sqlx::query("SELECT updated_at FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| read_error(key, e))?;

            row.map(|row| row.try_get::<String, _>("updated_at"))
                .transpose()
                .map_err(|e| StorageError::read(key, e.to_string()))
        })
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.runtime.block_on(async {
            let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| read_error(key, e))?;

            row.map(|row| row.try_get::<String, _>("value"))
                .transpose()
                .map_err(|e| StorageError::read(key, e.to_string()))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();

        self.runtime.block_on(async {
            sqlx::query(
                r#"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key)
                DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(&now)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(key, e))?;

            Ok(())
        })
    }
}

impl Drop for SqliteStorage {
    fn drop(&mut self) {
        // Let pending writes settle and release the file before the runtime goes away.
        self.runtime.block_on(self.pool.close());
    }
}

fn read_error(key: &str, err: sqlx::Error) -> StorageError {
    unavailable(&err).unwrap_or_else(|| StorageError::read(key, err.to_string()))
}

fn write_error(key: &str, err: sqlx::Error) -> StorageError {
    unavailable(&err).unwrap_or_else(|| StorageError::write(key, err.to_string()))
}

/// Pool-level failures say nothing about the slot itself.
fn unavailable(err: &sqlx::Error) -> Option<StorageError> {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            Some(StorageError::Unavailable(err.to_string()))
        }
        _ => None,
    }
}

/// Resolve the default database path: `{app_data_dir}/stocktally/inventory.db`.
pub fn default_db_path() -> anyhow::Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    let mut path = base;
    path.push("stocktally");
    path.push("inventory.db");
    Ok(path)
}

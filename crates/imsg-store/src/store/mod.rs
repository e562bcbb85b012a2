//! Read-only SQLite access to `chat.db`.
//!
//! Split into focused submodules:
//! - `messages`: recent, search, per-contact queries and attachment enrichment
//! - `chats`: chats, contact handles and attachment paths

mod chats;
mod messages;


use imsg_core::{config::StoreConfig, error::ImsgError};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Attempts to open the database before giving up on a lock.
const OPEN_ATTEMPTS: u32 = 3;

/// Read-only view of the Messages database.
#[derive(Clone)]
pub struct ChatStore {
    pool: SqlitePool,
}

impl ChatStore {
    /// Open the store at the configured (or `CHAT_DB_PATH`) location.
    pub async fn open(config: &StoreConfig) -> Result<Self, ImsgError> {
        Self::open_path(&config.resolved_db_path()).await
    }

    /// Open `db_path` read-only, retrying while the database is locked.
    pub async fn open_path(db_path: &str) -> Result<Self, ImsgError> {
        if !Path::new(db_path).exists() {
            return Err(ImsgError::Store(format!("chat.db not found at {db_path}")));
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| ImsgError::Store(format!("invalid db path: {e}")))?
            .read_only(true)
            .busy_timeout(Duration::from_secs(5))
            .pragma("query_only", "1");

        let mut attempt = 0;
        let pool = loop {
            attempt += 1;
            match SqlitePoolOptions::new()
                .max_connections(2)
                .connect_with(opts.clone())
                .await
            {
                Ok(pool) => break pool,
                Err(e) if is_locked(&e) && attempt < OPEN_ATTEMPTS => {
                    let delay = Duration::from_millis(500 * u64::from(attempt));
                    warn!(
                        "chat.db is locked, retrying in {}ms (attempt {attempt}/{OPEN_ATTEMPTS})",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(ImsgError::Store(format!(
                        "failed to open {db_path}: {e}"
                    )))
                }
            }
        };

        info!("Message store opened read-only at {db_path}");
        Ok(Self { pool })
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_locked(e: &sqlx::Error) -> bool {
    e.to_string().contains("database is locked")
}

//! API key store - SQLite persistence for REST API keys
//!
//! Keys are generated here and shown to the caller exactly once. Only their
//! SHA-256 digest is stored, plus an 8-character prefix for listings;
//! validation hashes the presented key and looks the digest up.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::Row;
use tracing::{debug, info};

use crate::error::{FireSrvError, Result};

/// Random bytes per generated key (hex encoded, so keys are 64 characters)
const KEY_BYTES: usize = 32;
/// Leading characters of a key kept in clear for listings
const KEY_PREFIX_LEN: usize = 8;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS api_keys (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    key_hash TEXT NOT NULL UNIQUE,
    key_prefix TEXT NOT NULL,
    created_at TEXT NOT NULL,
    last_used TEXT
)
"#;

/// Stored key metadata; never includes the key or its hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyInfo {
    pub id: i64,
    pub name: String,
    pub key_prefix: String,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

/// A freshly created key, the only place the raw key appears
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewApiKey {
    pub id: i64,
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct ApiKeyStore {
    pool: SqlitePool,
}

impl ApiKeyStore {
    /// Open (or create) the key database at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool).await?;
        info!("API key store opened: {}", path.display());
        Ok(store)
    }

    /// Private in-memory store, gone when dropped
    pub async fn in_memory() -> Result<Self> {
        // One connection that never expires; each in-memory connection is its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Generate, store and return a new key
    pub async fn create(&self, name: &str) -> Result<NewApiKey> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FireSrvError::validation("API key name cannot be empty"));
        }

        let bytes: [u8; KEY_BYTES] = rand::thread_rng().gen();
        let key = common::hex::encode_lower(&bytes);

        let result = sqlx::query(
            r#"
            INSERT INTO api_keys (name, key_hash, key_prefix, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(hash_key(&key))
        .bind(&key[..KEY_PREFIX_LEN])
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!("Created API key {} ({})", id, name);
        Ok(NewApiKey {
            id,
            name: name.to_string(),
            key,
        })
    }

    pub async fn list(&self) -> Result<Vec<ApiKeyInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, key_prefix, created_at, last_used
            FROM api_keys
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(hydrate_key).collect()
    }

    pub async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM api_keys")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }

    /// Returns `false` when no key has that id
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM api_keys WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!("Deleted API key {}", id);
        }
        Ok(deleted)
    }

    /// Check a presented key, returning its id and recording the use
    pub async fn validate(&self, key: &str) -> Result<Option<i64>> {
        if key.is_empty() {
            return Ok(None);
        }

        let row = sqlx::query("SELECT id FROM api_keys WHERE key_hash = ?")
            .bind(hash_key(key))
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let id: i64 = row.try_get("id")?;

        sqlx::query("UPDATE api_keys SET last_used = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!("API key {} accepted", id);
        Ok(Some(id))
    }
}

fn hash_key(key: &str) -> String {
    common::hex::encode_lower(&Sha256::digest(key.as_bytes()))
}

fn hydrate_key(row: &SqliteRow) -> Result<ApiKeyInfo> {
    Ok(ApiKeyInfo {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        key_prefix: row.try_get("key_prefix")?,
        created_at: row.try_get("created_at")?,
        last_used: row.try_get("last_used")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_validate() {
        let store = ApiKeyStore::in_memory().await.unwrap();
        let created = store.create("kitchen tablet").await.unwrap();

        assert_eq!(created.name, "kitchen tablet");
        assert_eq!(created.key.len(), KEY_BYTES * 2);
        assert_eq!(store.validate(&created.key).await.unwrap(), Some(created.id));
        assert_eq!(store.validate("not-a-key").await.unwrap(), None);
        assert_eq!(store.validate("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_only_hash_is_stored() {
        let store = ApiKeyStore::in_memory().await.unwrap();
        let created = store.create("phone").await.unwrap();

        let row = sqlx::query("SELECT key_hash, key_prefix FROM api_keys WHERE id = ?")
            .bind(created.id)
            .fetch_one(&store.pool)
            .await
            .unwrap();
        let stored_hash: String = row.get("key_hash");
        let prefix: String = row.get("key_prefix");

        assert_ne!(stored_hash, created.key);
        assert_eq!(stored_hash, hash_key(&created.key));
        assert_eq!(stored_hash.len(), 64);
        assert_eq!(prefix, created.key[..KEY_PREFIX_LEN]);
    }

    #[tokio::test]
    async fn test_keys_are_unique() {
        let store = ApiKeyStore::in_memory().await.unwrap();
        let first = store.create("a").await.unwrap();
        let second = store.create("a").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.key, second.key);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_records_last_use() {
        let store = ApiKeyStore::in_memory().await.unwrap();
        let created = store.create("automation").await.unwrap();

        let keys = store.list().await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].id, created.id);
        assert_eq!(keys[0].name, "automation");
        assert_eq!(keys[0].key_prefix, created.key[..KEY_PREFIX_LEN]);
        assert!(keys[0].last_used.is_none());

        store.validate(&created.key).await.unwrap();
        let keys = store.list().await.unwrap();
        assert!(keys[0].last_used.is_some());
        assert!(keys[0].last_used >= Some(keys[0].created_at));
    }

    #[tokio::test]
    async fn test_delete_revokes_key() {
        let store = ApiKeyStore::in_memory().await.unwrap();
        let created = store.create("old").await.unwrap();

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert_eq!(store.validate(&created.key).await.unwrap(), None);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let store = ApiKeyStore::in_memory().await.unwrap();
        let err = store.create("   ").await.unwrap_err();
        assert!(matches!(err, FireSrvError::ValidationError(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_keys_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("keys.db");

        let key = {
            let store = ApiKeyStore::open(&path).await.unwrap();
            let key = store.create("persistent").await.unwrap().key;
            store.pool.close().await;
            key
        };

        let store = ApiKeyStore::open(&path).await.unwrap();
        assert!(store.validate(&key).await.unwrap().is_some());
        assert_eq!(store.count().await.unwrap(), 1);
    }
}

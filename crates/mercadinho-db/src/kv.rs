//! # Key/Value Repository
//!
//! Raw access to the `kv_store` table.
//!
//! ## Store Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kv_store                                                               │
//! │                                                                         │
//! │  key               │ value (JSON text)           │ updated_at          │
//! │  ──────────────────┼─────────────────────────────┼──────────────       │
//! │  products          │ [{"code":"ALI0001",...}]    │ 2025-03-09 …        │
//! │  salesHistory      │ [{"number":"PED000001",…}]  │ 2025-03-09 …        │
//! │  lastOrderNumber   │ 42                          │ 2025-03-09 …        │
//! │  cart              │ {"items":[],"discount":0}   │ 2025-03-09 …        │
//! │  loggedIn          │ "Maria"                     │ 2025-03-09 …        │
//! │  salesGoal         │ 10000000                    │ 2025-03-09 …        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This layer deals in strings; the typed view lives in
//! [`crate::store::StateStore`]. Queries are bound at runtime, so the
//! crate builds without a database on disk.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Repository for raw key/value operations.
///
/// ## Usage
/// ```rust,ignore
/// let kv = KvRepository::new(pool);
/// kv.put("salesGoal", "10000000").await?;
/// let value = kv.get("salesGoal").await?;
/// ```
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    /// Creates a new KvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Reads the value stored under a key.
    ///
    /// ## Returns
    /// * `Ok(Some(value))` - Key exists
    /// * `Ok(None)` - Key was never written
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        debug!(key = %key, found = value.is_some(), "kv get");
        Ok(value)
    }

    /// Writes a value under a key, replacing any previous value.
    pub async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "kv put");
        Ok(())
    }

    /// Writes several keys in a single transaction.
    ///
    /// Either every entry lands or none does; a half-written checkout
    /// (order recorded but counter not bumped) must be impossible.
    pub async fn put_many(&self, entries: &[(&str, String)]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for (key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?1, ?2, datetime('now'))
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(keys = entries.len(), "kv put_many committed");
        Ok(())
    }

    /// Deletes a key.
    ///
    /// ## Returns
    /// `true` if the key existed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every key in the store, sorted.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn kv() -> KvRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().kv()
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let kv = kv().await;
        assert_eq!(kv.get("nothing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let kv = kv().await;

        kv.put("salesGoal", "10000000").await.unwrap();
        assert_eq!(
            kv.get("salesGoal").await.unwrap().as_deref(),
            Some("10000000")
        );
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let kv = kv().await;

        kv.put("cart", r#"{"items":[]}"#).await.unwrap();
        kv.put("cart", r#"{"items":[1]}"#).await.unwrap();

        assert_eq!(
            kv.get("cart").await.unwrap().as_deref(),
            Some(r#"{"items":[1]}"#)
        );
    }

    #[tokio::test]
    async fn test_put_many_and_keys() {
        let kv = kv().await;

        kv.put_many(&[
            ("products", "[]".to_string()),
            ("lastOrderNumber", "0".to_string()),
        ])
        .await
        .unwrap();

        assert_eq!(kv.keys().await.unwrap(), vec!["lastOrderNumber", "products"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let kv = kv().await;

        kv.put("loggedIn", "\"Maria\"").await.unwrap();
        assert!(kv.delete("loggedIn").await.unwrap());
        assert!(!kv.delete("loggedIn").await.unwrap());
        assert_eq!(kv.get("loggedIn").await.unwrap(), None);
    }
}
